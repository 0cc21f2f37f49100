//! Stage channels and the generic stage worker loop.

use std::path::Path;
use tokio::sync::mpsc;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};

/// Create the channel connecting two stages, sized from the config.
///
/// When the buffer is full the sender suspends, so a slow stage throttles
/// every stage upstream of it.
pub fn stage_channel<T>(config: &PipelineConfig) -> (mpsc::Sender<T>, mpsc::Receiver<T>) {
    mpsc::channel(config.buffer_size)
}

/// One pipeline stage: pulls from an input channel, pushes to an output channel.
///
/// Every received item produces exactly one sent item, in receive order. The
/// output channel closes when the stage is dropped, which happens once the
/// input is closed and drained.
pub struct PipelineStage<I, O> {
    name: &'static str,
    input: mpsc::Receiver<I>,
    output: mpsc::Sender<O>,
}

impl<I, O> PipelineStage<I, O> {
    /// Create a new pipeline stage.
    pub fn new(name: &'static str, input: mpsc::Receiver<I>, output: mpsc::Sender<O>) -> Self {
        Self {
            name,
            input,
            output,
        }
    }

    /// Run the stage with a processing function until the input is drained.
    pub async fn run<F, Fut>(mut self, mut f: F)
    where
        F: FnMut(I) -> Fut,
        Fut: std::future::Future<Output = O>,
    {
        let mut forwarded: usize = 0;
        while let Some(item) = self.input.recv().await {
            let result = f(item).await;
            if self.output.send(result).await.is_err() {
                tracing::warn!(
                    "{} stage: downstream closed after {} item(s), stopping",
                    self.name,
                    forwarded
                );
                return;
            }
            forwarded += 1;
        }
        tracing::debug!("{} stage drained ({} item(s))", self.name, forwarded);
    }
}

/// Run blocking work (codec I/O, pixel transforms) off the async workers.
///
/// The caller awaits the result, so a stage still handles one item at a time.
/// A panic inside `work` becomes a [`PipelineError::Worker`] for that item.
pub async fn run_blocking<T, F>(path: &Path, stage: &'static str, work: F) -> PipelineResult<T>
where
    F: FnOnce() -> PipelineResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result,
        Err(e) => Err(PipelineError::Worker {
            path: path.to_path_buf(),
            stage,
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stage_channel_capacity() {
        let config = PipelineConfig { buffer_size: 2 };
        let (tx, mut rx) = stage_channel::<i32>(&config);

        tx.send(1).await.unwrap();
        tx.send(2).await.unwrap();
        assert!(tx.try_send(3).is_err());

        assert_eq!(rx.recv().await, Some(1));
    }

    #[tokio::test]
    async fn test_pipeline_stage_one_to_one_in_order() {
        let (input_tx, input_rx) = mpsc::channel::<i32>(1);
        let (output_tx, mut output_rx) = mpsc::channel::<i32>(1);

        let stage = PipelineStage::new("double", input_rx, output_tx);
        tokio::spawn(stage.run(|x| async move { x * 2 }));

        tokio::spawn(async move {
            for i in 0..5 {
                input_tx.send(i).await.unwrap();
            }
        });

        let mut seen = Vec::new();
        while let Some(v) = output_rx.recv().await {
            seen.push(v);
        }
        // Output closes once the input sender is dropped and drained.
        assert_eq!(seen, vec![0, 2, 4, 6, 8]);
    }

    #[tokio::test]
    async fn test_pipeline_stage_stops_when_downstream_closes() {
        let (input_tx, input_rx) = mpsc::channel::<i32>(4);
        let (output_tx, output_rx) = mpsc::channel::<i32>(1);
        drop(output_rx);

        let handle = tokio::spawn(PipelineStage::new("orphan", input_rx, output_tx).run(
            |x| async move { x },
        ));
        input_tx.send(1).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_run_blocking_maps_panic() {
        let result: PipelineResult<()> =
            run_blocking(Path::new("x.png"), "resize", || panic!("bad pixels")).await;
        assert!(matches!(
            result,
            Err(PipelineError::Worker { stage: "resize", .. })
        ));
    }
}
