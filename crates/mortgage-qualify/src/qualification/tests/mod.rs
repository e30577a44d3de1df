mod borrowing_power;
mod common;
mod limits;
mod solver;
