pub mod line_equation;
pub mod pitch;
pub mod point;
pub mod range;
pub mod raster;
pub mod staff;
pub mod staff_line;

pub use line_equation::LineEquation;
pub use pitch::{Letter, Pitch};
pub use point::Point;
pub use range::Range;
pub use raster::BinaryRaster;
pub use staff::{STAFF_LINES, Staff, StaffBounds};
pub use staff_line::{LineSummary, StaffLine};
