//! Sand rule: fall, else slide diagonally, else stay.

use rand::Rng;

use crate::api::StepApi;
use crate::config::SimulationConfig;

pub fn update_sand<R: Rng>(api: &mut StepApi<'_, R>, config: &SimulationConfig) {
    if api.chance(config.vertical_move_chance) && api.vacant(1, 0) {
        api.move_to(1, 0);
        return;
    }

    // Random first diagonal so left-to-right scanning doesn't bias piles.
    if api.chance(config.lateral_move_chance) {
        let dir = api.random_direction();
        if api.vacant(1, dir) {
            api.move_to(1, dir);
            return;
        }
        if api.vacant(1, -dir) {
            api.move_to(1, -dir);
            return;
        }
    }

    api.stay();
}
