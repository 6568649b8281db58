//! Perk milestones and weighted offer generation.

use std::collections::BTreeSet;

use rand::distributions::{Distribution, WeightedIndex};
use rand_chacha::ChaCha8Rng;

use netguard_core::archetypes::perk_archetype;
use netguard_core::constants::{PERK_MILESTONE_INTERVAL, PERK_OFFER_SIZE};
use netguard_core::enums::PerkKind;
use netguard_core::state::{PerkChoiceView, PerkOfferView};

/// Per-match perk bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct PerkState {
    /// Wave indices whose milestone offer has been resolved.
    claimed: BTreeSet<u32>,
    /// Outstanding offer, if any.
    offer: Option<Vec<PerkKind>>,
}

impl PerkState {
    /// Whether starting wave `wave_index` must first go through an offer.
    pub fn milestone_due(&self, wave_index: u32, level_complete: bool) -> bool {
        wave_index > 0
            && wave_index % PERK_MILESTONE_INTERVAL == 0
            && !level_complete
            && !self.claimed.contains(&wave_index)
    }

    pub fn offer(&self) -> Option<&[PerkKind]> {
        self.offer.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.offer.is_some()
    }

    pub fn set_offer(&mut self, choices: Vec<PerkKind>) {
        self.offer = Some(choices);
    }

    /// Resolve the outstanding offer with `perk`, claiming `wave_index`.
    /// Returns `false` (and changes nothing) if `perk` was not offered.
    pub fn claim(&mut self, perk: PerkKind, wave_index: u32) -> bool {
        match &self.offer {
            Some(choices) if choices.contains(&perk) => {
                self.offer = None;
                self.claimed.insert(wave_index);
                true
            }
            _ => false,
        }
    }

    pub fn claimed(&self) -> &BTreeSet<u32> {
        &self.claimed
    }

    pub fn view(&self) -> Option<PerkOfferView> {
        self.offer.as_ref().map(|choices| PerkOfferView {
            choices: choices
                .iter()
                .map(|&perk| {
                    let archetype = perk_archetype(perk);
                    PerkChoiceView {
                        perk,
                        name: archetype.name.to_string(),
                        description: archetype.description.to_string(),
                        rarity: archetype.rarity,
                    }
                })
                .collect(),
        })
    }
}

/// Draw `PERK_OFFER_SIZE` distinct perks, weighted by rarity, without
/// replacement.
pub fn roll_offer(rng: &mut ChaCha8Rng) -> Vec<PerkKind> {
    let mut pool: Vec<PerkKind> = PerkKind::ALL.to_vec();
    let mut choices = Vec::with_capacity(PERK_OFFER_SIZE);

    while choices.len() < PERK_OFFER_SIZE && !pool.is_empty() {
        let weights = pool.iter().map(|&p| perk_archetype(p).weight);
        let Ok(dist) = WeightedIndex::new(weights) else {
            break;
        };
        let picked = pool.remove(dist.sample(rng));
        choices.push(picked);
    }
    choices
}
