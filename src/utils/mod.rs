pub mod month_year;
pub mod validation;

pub use month_year::*;
pub use validation::*;
