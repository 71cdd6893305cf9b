use crate::models::{self, Owner};

pub struct OwnerController;

impl OwnerController {
    /// @resource owners "Owner operations"
    /// @param owners body []models.Owner true "owners to import"
    /// @success 200 {array} Owner "imported owners"
    /// @router /admin/owners [put]
    pub fn import(&self) {}

    /// @resource owners
    /// @param id path models.PetId true "pet id"
    /// @param X-Request-Id header string false "request id"
    /// @success 200 {object} map[string]models.Pet "pets by name"
    /// @router /admin/owners/:id/pets [get]
    pub fn pets(&self) {}
}
