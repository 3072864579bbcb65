pub mod airfoil;
pub mod diversity;
pub mod errors;
pub mod geometry;
pub mod serialize;
pub mod session;

pub use airfoil::generate::AirfoilFamily;
pub use airfoil::params::ShapeParameters;
pub use airfoil::validate::{validate_geometry, ValidationResult};
pub use airfoil::CoordinateLoop;
pub use errors::{AeroError, Result};
pub use session::DesignSession;
