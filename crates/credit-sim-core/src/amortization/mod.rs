pub mod calendar;
pub mod payment;
pub mod product;
pub mod rates;
pub mod rounding;
pub mod schedule;
