mod make_cuboid;
mod make_cylinder;
mod make_sphere;

pub use make_cuboid::MakeCuboid;
pub use make_cylinder::{CylinderMesh, MakeCylinder};
pub use make_sphere::MakeSphere;
