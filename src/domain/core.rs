mod availability;
mod city;
mod reservation;
mod route;
mod validator;

pub use self::availability::*;
pub use self::city::*;
pub use self::reservation::*;
pub use self::route::*;
pub use self::validator::*;
