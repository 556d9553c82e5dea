use super::PetError;
use crate::models::Counters;

pub async fn health() -> Result<(), PetError> {
    Ok(())
}

/// Echoes every bound value back
pub async fn counters(req: Counters) -> Result<Counters, PetError> {
    Ok(req)
}
