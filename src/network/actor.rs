//! Executor actor - runs executions as Tokio tasks off the caller's thread

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::messages::{ExecutionReport, ExecutorCommand};
use crate::network::executor::Executor;
use crate::network::transport::Transport;

/// Actor that executes blocks concurrently and reports each outcome
pub struct ExecutorActor<T> {
    executor: Arc<Executor<T>>,
    report_tx: mpsc::UnboundedSender<ExecutionReport>,
    active_requests: JoinSet<()>,
}

impl<T: Transport + 'static> ExecutorActor<T> {
    pub fn new(executor: Executor<T>, report_tx: mpsc::UnboundedSender<ExecutionReport>) -> Self {
        ExecutorActor {
            executor: Arc::new(executor),
            report_tx,
            active_requests: JoinSet::new(),
        }
    }

    /// Run the actor message loop until `Shutdown` or the command channel closes
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<ExecutorCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(ExecutorCommand::Execute { id, block }) => {
                            let report_tx = self.report_tx.clone();
                            let executor = Arc::clone(&self.executor);

                            self.active_requests.spawn(async move {
                                let result = executor.execute_block(&block).await;
                                tracing::debug!(id, status = result.status, "Execution finished");
                                let _ = report_tx.send(ExecutionReport::new(id, block, result));
                            });
                        }

                        Some(ExecutorCommand::Shutdown) | None => break,
                    }
                }

                // Reap completed tasks
                Some(_result) = self.active_requests.join_next() => {}
            }
        }

        // Let in-flight executions report before the report channel closes
        let pending = self.active_requests.len();
        if pending > 0 {
            tracing::info!(pending, "Waiting for in-flight requests");
        }
        while self.active_requests.join_next().await.is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::executor::tests::FakeTransport;
    use crate::parser::parse;

    #[tokio::test]
    async fn test_every_command_is_reported_before_shutdown_completes() {
        let blocks = parse("GET https://a.example.com\n\nGET https://b.example.com\n\nPOST https://c.example.com\n\n{}");
        assert_eq!(blocks.len(), 3);

        let transport = FakeTransport::ok(200, "ok");
        let sent = Arc::clone(&transport.sent);
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (report_tx, mut report_rx) = mpsc::unbounded_channel();

        let actor = ExecutorActor::new(Executor::new(transport), report_tx);
        let handle = tokio::spawn(actor.run(cmd_rx));

        for (id, block) in blocks.iter().cloned().enumerate() {
            cmd_tx
                .send(ExecutorCommand::Execute { id: id as u64, block })
                .unwrap();
        }
        cmd_tx.send(ExecutorCommand::Shutdown).unwrap();
        handle.await.unwrap();

        let mut ids = Vec::new();
        while let Some(report) = report_rx.recv().await {
            assert_eq!(report.result.status, 200);
            assert_eq!(report.block, blocks[report.id as usize]);
            ids.push(report.id);
        }
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(sent.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_closed_command_channel_stops_actor() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<ExecutorCommand>();
        let (report_tx, mut report_rx) = mpsc::unbounded_channel();
        let actor = ExecutorActor::new(Executor::new(FakeTransport::ok(204, "")), report_tx);

        drop(cmd_tx);
        actor.run(cmd_rx).await;
        assert!(report_rx.recv().await.is_none());
    }
}
