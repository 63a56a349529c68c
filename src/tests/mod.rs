#[macro_use]
mod util;

mod serialize;
mod tree;
