//! The button-shaped interface a host registers the game under.

use futures_util::{FutureExt, future::BoxFuture};
use game_api_types::{Command, CommandResponse, Geometry, is_get_data};

use crate::{
    controller::GameController,
    error::{GameError, Result},
};

pub trait Button: Send + Sync {
    /// A press asks for a new game.
    fn push(&self) -> BoxFuture<'_, Result<()>>;

    fn do_command<'a>(&'a self, command: &'a Command) -> BoxFuture<'a, Result<CommandResponse>>;

    fn geometries(&self) -> BoxFuture<'_, Result<Vec<Geometry>>>;

    fn close(&self) -> BoxFuture<'_, Result<()>>;
}

impl Button for GameController {
    fn push(&self) -> BoxFuture<'_, Result<()>> {
        async move {
            tracing::info!("`push` is called");
            self.request_new_game();
            Ok(())
        }
        .boxed()
    }

    fn do_command<'a>(&'a self, command: &'a Command) -> BoxFuture<'a, Result<CommandResponse>> {
        async move {
            if !is_get_data(command) {
                return Ok(CommandResponse::new());
            }

            Ok(self.status().await.to_data().into_response())
        }
        .boxed()
    }

    fn geometries(&self) -> BoxFuture<'_, Result<Vec<Geometry>>> {
        async move {
            tracing::error!("`get_geometries` is not implemented");
            Err(GameError::NotImplemented("get_geometries"))
        }
        .boxed()
    }

    fn close(&self) -> BoxFuture<'_, Result<()>> {
        async move {
            GameController::close(self).await;
            Ok(())
        }
        .boxed()
    }
}
