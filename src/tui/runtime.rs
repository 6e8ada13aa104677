use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use super::app::{Effect, UiEvent};
use crate::application::notifier::Notifier;
use crate::application::store::{Intent, Store};
use crate::application::sync_actions::SyncActions;
use crate::domain::cover::CoverFile;
use crate::domain::remote::TodoApi;

/// Actions as the terminal front-end wires them: errors flow into the UI channel.
pub type ClientActions<A> = SyncActions<A, UnboundedSender<String>, Store>;

/// Starts the work behind `effect` without blocking the caller. `Quit` is left to the event loop.
pub fn run_effect<A: TodoApi>(actions: &ClientActions<A>, effect: Effect, events: &UnboundedSender<UiEvent>) {
    let actions = actions.clone();
    match effect {
        Effect::Quit => {}
        Effect::DismissError => actions.dispatcher().dispatch(Intent::ErrorDismissed),
        Effect::LoadList(filter) => { tokio::spawn(async move { actions.list(filter).await; }); }
        Effect::OpenDetail(id) => { tokio::spawn(async move { actions.detail(id).await; }); }
        Effect::Save(id, update) => { tokio::spawn(async move { actions.edit(id, update).await; }); }
        Effect::Create(new, filter) => {
            tokio::spawn(async move {
                if actions.create(new).await { actions.list(filter).await; }
            });
        }
        Effect::Delete(id, filter) => {
            tokio::spawn(async move {
                if actions.delete(id).await { actions.list(filter).await; }
            });
        }
        Effect::UploadCover(id, path) => {
            let events = events.clone();
            tokio::spawn(async move {
                let succeeded = match CoverFile::from_path(&path).await {
                    Ok(cover) => actions.change_cover(id, cover).await,
                    Err(err) => {
                        warn!(%id, error = %err, "cover not uploaded");
                        actions.notifier().error(&err.to_string());
                        false
                    }
                };
                let _ = events.send(UiEvent::CoverSettled { id, succeeded });
            });
        }
    }
}
