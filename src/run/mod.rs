//! Pipeline run: stages and the driver that sequences them.

mod driver;
mod stage;

pub use driver::{run_pipeline, PipelineDriver, QueryOutcome, RunReport};
pub use stage::Stage;

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
