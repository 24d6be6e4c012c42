pub mod check;
pub mod new;
