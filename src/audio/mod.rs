pub mod analysis;
pub mod decode;
pub mod features;
pub mod frame;
pub mod normalize;
pub mod smooth;
