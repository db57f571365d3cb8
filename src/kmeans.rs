//! Segmentation by k-means clusters of the standardized features.

mod elbow;
mod fit;
mod init;
mod lloyd;


pub use elbow::{elbow_curve, ElbowCurve, ElbowPoint};
pub use fit::KMeansFit;
pub use init::Init;
pub use lloyd::{KMeans, DEFAULT_MAX_ITER, DEFAULT_N_INIT, DEFAULT_TOLERANCE};
