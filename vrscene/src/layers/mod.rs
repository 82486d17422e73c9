pub mod interaction;
pub mod space;
pub mod flying;
