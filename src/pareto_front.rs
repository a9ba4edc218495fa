// Copyright  (C) 2020, Kisio Digital and/or its affiliates. All rights reserved.
//
// This file is part of Navitia,
// the software to build cool stuff with public transport.
//
// Hope you'll enjoy and contribute to this project,
// powered by Kisio Digital (www.kisio.com).
// Help us simplify mobility and open public transport:
// a non ending quest to the responsive locomotion way of traveling!
//
// This contribution is a part of the research and development work of the
// IVA Project which aims to enhance traveler information and is carried out
// under the leadership of the Technological Research Institute SystemX,
// with the partnership and support of the transport organization authority
// Ile-De-France Mobilités (IDFM), SNCF, and public funds
// under the scope of the French Program "Investissements d’Avenir".
//
// LICENCE: This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.
//
// Stay tuned using
// twitter @navitia
// channel `#navitia` on riot https://riot.im/app/#/room/#navitia:matrix.org
// https://groups.google.com/d/forum/navitia
// www.navitia.io

use std::slice::Iter as SliceIter;
use std::vec::Drain as DrainIter;

/// Comparison of criteria, which may depend on the context of the search
/// (for example on its direction).
pub trait Dominance<Criteria> {
    /// Is `lower` at least as good as `upper` on every criterion ?
    fn dominates(&self, lower: &Criteria, upper: &Criteria) -> bool;
}

/// A set of elements, none of them being dominated by another one.
///
/// When two elements have the same criteria, the first one added is kept.
#[derive(Debug, Clone)]
pub struct ParetoFront<Id, Criteria> {
    elements: Vec<(Id, Criteria)>,
}

impl<Id, Criteria> Default for ParetoFront<Id, Criteria> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id, Criteria> ParetoFront<Id, Criteria> {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Is `criteria` dominated by an element of the front ?
    pub fn dominates<D>(&self, criteria: &Criteria, dominance: &D) -> bool
    where
        D: Dominance<Criteria>,
    {
        self.elements
            .iter()
            .any(|(_, old_criteria)| dominance.dominates(old_criteria, criteria))
    }

    pub fn add_unchecked(&mut self, id: Id, criteria: Criteria) {
        self.elements.push((id, criteria));
    }

    pub fn remove_elements_dominated_by<D>(&mut self, criteria: &Criteria, dominance: &D)
    where
        D: Dominance<Criteria>,
    {
        self.elements
            .retain(|(_, old_criteria)| !dominance.dominates(criteria, old_criteria));
    }

    pub fn add_and_remove_elements_dominated<D>(&mut self, id: Id, criteria: Criteria, dominance: &D)
    where
        D: Dominance<Criteria>,
    {
        self.remove_elements_dominated_by(&criteria, dominance);
        self.add_unchecked(id, criteria);
    }

    /// Returns `false` when `criteria` is dominated, and the front is unchanged.
    pub fn add<D>(&mut self, id: Id, criteria: Criteria, dominance: &D) -> bool
    where
        D: Dominance<Criteria>,
    {
        if self.dominates(&criteria, dominance) {
            return false;
        }
        self.add_and_remove_elements_dominated(id, criteria, dominance);
        true
    }

    pub fn merge_with<D>(&mut self, other: Self, dominance: &D)
    where
        D: Dominance<Criteria>,
    {
        for (id, criteria) in other.elements {
            self.add(id, criteria, dominance);
        }
    }

    pub fn iter(&self) -> SliceIter<'_, (Id, Criteria)> {
        self.elements.iter()
    }

    pub fn drain(&mut self) -> DrainIter<'_, (Id, Criteria)> {
        self.elements.drain(..)
    }

    pub fn into_elements(self) -> Vec<(Id, Criteria)> {
        self.elements
    }
}
