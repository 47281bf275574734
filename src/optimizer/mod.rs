//! # Optimizer Module
//!
//! Separa le responsabilità del batch in sottomoduli:
//! - `batch`: Orchestratore principale (`BatchController`)
//! - `task_optimizer`: Worker per singoli file
//! - `progress_tracker`: Collaboratore `Reporter` e calcolo avanzamento
//! - `path_resolver`: Logica di calcolo path centralizzata
//! - `worker`: Esecuzione in background con eventi su canale

pub mod batch;
pub mod path_resolver;
pub mod progress_tracker;
pub mod task_optimizer;
pub mod worker;

pub use batch::BatchController;
pub use path_resolver::PathResolver;
pub use progress_tracker::{BatchEvent, ProgressTracker, Reporter};
pub use task_optimizer::TaskOptimizer;
pub use worker::{spawn_batch, ChannelReporter};
