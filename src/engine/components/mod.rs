pub mod camera;
pub mod mesh;
pub mod shapes;
pub mod texture;

pub use camera::{ Camera, Composition, DisplayMode, OrientationMapping, Projection };
pub use mesh::{ Mesh, Topology, VertexAttribute };
pub use texture::{ DecodedImage, Texture };
