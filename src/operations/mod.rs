pub mod creation;
pub mod ground;
pub mod noise;
pub mod offset;
pub mod placement;
pub mod trench;
pub mod triangulate;
