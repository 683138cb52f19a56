use crate::core::AppError;
use crate::db::Storage;
use crate::models::states::{sort_by_name, State};

pub async fn fetch_states(storage: &dyn Storage) -> Result<Vec<State>, AppError> {
    let states = storage.all_states().await?;

    Ok(sort_by_name(states.into_values()))
}
