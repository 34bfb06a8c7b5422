use crate::engine::config::EngineConfig;
use crate::engine::search::AlphaBetaEngine;
use crate::engine::{Move, SearchStats};
use crate::logic::board::Board;
use gloo_worker::{HandlerId, Worker, WorkerScope};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Searches run to completion inside the worker. A host that wants a move
/// sooner drops the bridge and ignores the reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Input {
    ComputeMove(Board, u8, EngineConfig),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Output {
    MoveFound(Move, SearchStats),
    NoMove,
}

#[derive(Default)]
pub struct BattleWorker {
    engine: Option<AlphaBetaEngine>,
}

impl BattleWorker {
    pub fn handle(&mut self, msg: Input) -> Output {
        match msg {
            Input::ComputeMove(board, depth, config) => {
                let config = Arc::new(config);
                let engine = self
                    .engine
                    .get_or_insert_with(|| AlphaBetaEngine::new(Arc::clone(&config)));
                engine.update_config(config);

                engine
                    .compute_move(&board, depth)
                    .map_or(Output::NoMove, |(mv, stats)| Output::MoveFound(mv, stats))
            }
        }
    }
}

impl Worker for BattleWorker {
    type Input = Input;
    type Message = ();
    type Output = Output;

    fn create(_scope: &WorkerScope<Self>) -> Self {
        Self::default()
    }

    fn update(&mut self, _scope: &WorkerScope<Self>, _msg: Self::Message) {}

    fn received(&mut self, scope: &WorkerScope<Self>, msg: Self::Input, id: HandlerId) {
        let output = self.handle(msg);
        scope.respond(id, output);
    }
}
