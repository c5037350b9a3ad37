pub mod assets_manager;

pub use assets_manager::{ shader_source, ShaderAsset, ShaderSource };
