pub use crate::math::{entropy_from_counts, information_gain};
pub use crate::math::{max_index, round_to, standard_normal_cdf};
