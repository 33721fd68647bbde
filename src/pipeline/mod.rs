// Collection pipeline — fetch cycles and the periodic daemon around them.

pub mod daemon;
pub mod fetch;
