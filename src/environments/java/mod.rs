pub mod jdk;
pub mod probe;
pub mod registry;
pub mod scanner;

pub use jdk::{Jdk, JdkRecord};
pub use probe::{JdkLayout, JdkProbe, LauncherProbe, ProbeOutcome};
pub use registry::Registry;
pub use scanner::{ScanIter, Scanner};
