use super::PetError;
use crate::models::{CreatePet, GetPet, Pet};

/// An empty store: the list is `None`, not an empty vector
pub async fn list_pets() -> Result<Option<Vec<Pet>>, PetError> {
    Ok(None)
}

pub async fn create_pet(req: CreatePet) -> Result<Pet, PetError> {
    let id = if req.dry_run == Some(true) { 0 } else { 1 };
    Ok(Pet {
        id,
        name: req.name,
        ..Pet::default()
    })
}

pub async fn get_pet(req: GetPet) -> Result<Pet, PetError> {
    match req.id {
        0 => Err(PetError::NotFound(0)),
        13 => Err(PetError::Storage),
        id => Ok(Pet {
            id,
            name: "Rex".to_string(),
            tags: req.tags,
            verbose: req.verbose,
        }),
    }
}
