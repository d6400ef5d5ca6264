/// Series comparison utilities.
///
/// Submodules:
/// - `alignment` - overlapping date windows and subsetting of series to them.
///
/// Plotting of aligned series is left to external tools.

pub mod alignment;
