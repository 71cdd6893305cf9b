use crate::models;
use crate::models::PetList;

pub struct PetController;

impl PetController {
    /// @title List pets
    /// @description Returns every pet in the store.
    /// @resource pets "Pet operations"
    /// @param limit query int false "maximum number of results"
    /// @success 200 {array} models.Pet "a list of pets"
    /// @failure 500 {object} models.ErrorResponse "server error"
    /// @produce json, xml
    /// @router /pets [get]
    pub fn list(&self) -> PetList {
        Vec::new()
    }

    /// @title Find pet by id
    /// @resource pets "Pet operations"
    /// @param id path int true "pet id"
    /// @success 200 {object} models.Pet "the pet"
    /// @failure 404 {object} models.ErrorResponse "not found"
    /// @router /pets/:id [get]
    pub fn get(&self, id: i64) -> Option<models::Pet> {
        let _ = id;
        None
    }

    /// @title Create pet
    /// @resource pets
    /// @accept json
    /// @param pet body models.Pet true "the pet to store"
    /// @success 201 {object} models.Pet "created"
    /// @router /pets [post]
    pub fn create(&self, pet: models::Pet) -> models::Pet {
        pet
    }
}

/// Second declaration of an already documented route
///
/// @title Shadowed lookup
/// @success 200 {object} string "ignored"
/// @router /pets/{id} [get]
pub fn get_pet_legacy() {}

/// Not an endpoint
pub fn helper() {}
