use crate::ship::ShipKind;

pub const BOARD_SIZE: u8 = 10;
pub const NUM_SHIPS: usize = 5;
pub const SHIPS: [ShipKind; NUM_SHIPS] = [
    ShipKind::new("carrier", 5),
    ShipKind::new("battleship", 4),
    ShipKind::new("cruiser", 3),
    ShipKind::new("submarine", 3),
    ShipKind::new("destroyer", 2),
];

/// Total number of ship segments in the standard fleet.
pub const TOTAL_SHIP_CELLS: usize = 5 + 4 + 3 + 3 + 2;
