use rand::Rng;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::MenuCatalog;
use crate::category::Category;
use crate::error::PlannerError;
use crate::menu::MenuEntry;

/// Working list of candidate menus per category.
///
/// Seeded once per session by shuffling the canonical catalog, shrunk by
/// commits and grown back only by undo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuPool {
    menus: BTreeMap<Category, Vec<MenuEntry>>,
}

impl Default for MenuPool {
    fn default() -> Self {
        Self {
            menus: Category::ORDER
                .into_iter()
                .map(|category| (category, Vec::new()))
                .collect(),
        }
    }
}

impl MenuPool {
    /// Copy every category's source bucket and apply a uniform shuffle.
    ///
    /// Snack categories receive independently shuffled copies of the same bucket.
    pub fn seed<R: Rng + ?Sized>(catalog: &MenuCatalog, rng: &mut R) -> Self {
        let mut pool = Self::default();
        for category in Category::ORDER {
            let mut menus = catalog.entries(category.source_bucket()).to_vec();
            menus.shuffle(rng);
            pool.menus.insert(category, menus);
        }
        pool
    }

    /// Deterministic seeding: the same catalog and seed give the same pool.
    #[must_use]
    pub fn seeded(catalog: &MenuCatalog, seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        Self::seed(catalog, &mut rng)
    }

    /// Build a pool with a fixed ordering, skipping the shuffle.
    #[must_use]
    pub fn from_ordered(menus: impl IntoIterator<Item = (Category, Vec<MenuEntry>)>) -> Self {
        let mut pool = Self::default();
        pool.menus.extend(menus);
        pool
    }

    #[must_use]
    pub fn entries(&self, category: Category) -> &[MenuEntry] {
        self.menus
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn get(&self, category: Category, index: usize) -> Option<&MenuEntry> {
        self.entries(category).get(index)
    }

    #[must_use]
    pub fn len(&self, category: Category) -> usize {
        self.entries(category).len()
    }

    #[must_use]
    pub fn is_empty(&self, category: Category) -> bool {
        self.entries(category).is_empty()
    }

    #[must_use]
    pub fn total_len(&self) -> usize {
        self.menus.values().map(Vec::len).sum()
    }

    /// Remove and return the entry at `index`.
    ///
    /// Callers holding an index into this category must re-clamp it afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::OutOfRange`] if `index` does not address an entry.
    pub fn remove_at(
        &mut self,
        category: Category,
        index: usize,
    ) -> Result<MenuEntry, PlannerError> {
        let menus = self.menus.entry(category).or_default();
        if index >= menus.len() {
            return Err(PlannerError::OutOfRange {
                category,
                index,
                len: menus.len(),
            });
        }
        Ok(menus.remove(index))
    }

    /// Remove the first entry named `menu_name`, if present.
    ///
    /// Used when a pool has to be reseeded under an existing selection, so that
    /// committed menus are not offered a second time.
    pub fn withdraw(&mut self, category: Category, menu_name: &str) -> Option<MenuEntry> {
        let menus = self.menus.get_mut(&category)?;
        let index = menus.iter().position(|menu| menu.menu_name == menu_name)?;
        Some(menus.remove(index))
    }

    /// Insert `entry` at `min(index, len)`. Only undo grows a pool.
    pub fn insert_at(&mut self, category: Category, index: usize, entry: MenuEntry) {
        let menus = self.menus.entry(category).or_default();
        let index = index.min(menus.len());
        menus.insert(index, entry);
    }
}
