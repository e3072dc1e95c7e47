mod reservation;

pub use self::reservation::*;
