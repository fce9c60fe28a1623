use std::collections::HashMap;
use std::collections::hash_map::Entry;

use indexmap::IndexMap;
use petgraph::unionfind::UnionFind;

use crate::net::{Columns, Idx, IndexVec, Net, NetError, SpeciesId, TransitionId};
use crate::open::wiring::{JunctionId, Wiring, WiringBox};
use crate::open::{CompositionError, Leg, OpenNet};

/// Disjoint union of `nets`, in order. Returns the sum and the species offset
/// of each summand.
///
/// The sum keeps only the attribute columns every summand carries.
pub fn coproduct<'a>(
    nets: impl IntoIterator<Item = &'a Net>,
) -> Result<(Net, Vec<usize>), NetError> {
    let nets: Vec<&Net> = nets.into_iter().collect();
    let columns = nets
        .iter()
        .map(|net| net.columns())
        .reduce(|a, b| a & b)
        .unwrap_or(Columns::PETRI);
    for net in &nets {
        let dropped = net.columns() - columns;
        if !dropped.is_empty() {
            log::warn!("coproduct drops columns {dropped:?} missing from another summand");
        }
    }

    let mut sum = Net::with_columns(columns);
    let mut offsets = Vec::with_capacity(nets.len());
    for net in nets {
        let species_offset = sum.species_count();
        let transition_offset = sum.transition_count();
        for species in net.species() {
            sum.add_species_with(net.species_record(species)?)?;
        }
        for transition in net.transitions() {
            sum.add_transition_with(net.transition_record(transition)?)?;
        }
        let shift = |transition: TransitionId, species: SpeciesId| {
            (
                TransitionId::from_usize(transition.index() + transition_offset),
                SpeciesId::from_usize(species.index() + species_offset),
            )
        };
        for arc in net.input_arcs() {
            let (transition, species) = shift(arc.transition, arc.species);
            sum.add_input(transition, species)?;
        }
        for arc in net.output_arcs() {
            let (transition, species) = shift(arc.transition, arc.species);
            sum.add_output(transition, species)?;
        }
        offsets.push(species_offset);
    }
    Ok((sum, offsets))
}

/// Collapses every class of `classes` onto its smallest species. Transitions
/// are kept one for one. Returns the quotient and, for every species of
/// `net`, the species it became.
fn quotient(net: &Net, classes: &UnionFind<usize>) -> Result<(Net, Vec<SpeciesId>), NetError> {
    let mut apex = Net::with_columns(net.columns());
    let mut survivors: HashMap<usize, SpeciesId> = HashMap::new();
    let mut image = Vec::with_capacity(net.species_count());
    // Ascending scan, so the first member seen of a class is its smallest.
    for species in net.species() {
        let id = match survivors.entry(classes.find(species.index())) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => *entry.insert(apex.add_species_with(net.species_record(species)?)?),
        };
        image.push(id);
    }
    for transition in net.transitions() {
        apex.add_transition_with(net.transition_record(transition)?)?;
    }
    for arc in net.input_arcs() {
        apex.add_input(arc.transition, image[arc.species.index()])?;
    }
    for arc in net.output_arcs() {
        apex.add_output(arc.transition, image[arc.species.index()])?;
    }
    Ok((apex, image))
}

/// Glues the open nets bound to the boxes of `wiring` along its junctions.
///
/// Every leg attached to a junction is identified position by position with
/// every other leg attached to it, transitively. Each merged class keeps the
/// attributes of its smallest species. The composite exposes one leg per
/// outer port of the wiring.
pub fn compose(
    wiring: &Wiring,
    nets: &IndexMap<String, OpenNet>,
) -> Result<OpenNet, CompositionError> {
    let bound = wiring
        .boxes()
        .map(|(_, b)| bind(b, nets))
        .collect::<Result<Vec<_>, _>>()?;
    let (sum, offsets) = coproduct(bound.iter().map(|(_, open)| open.apex()))?;

    let mut attached: IndexVec<JunctionId, Vec<Leg>> =
        wiring.junctions().map(|_| Vec::new()).collect();
    for ((b, open), offset) in bound.iter().zip(&offsets) {
        for (&junction, leg) in b.ports.iter().zip(open.legs()) {
            attached[junction].push(leg.map(|s| SpeciesId::from_usize(s.index() + offset)));
        }
    }

    let mut classes = UnionFind::<usize>::new(sum.species_count());
    for (junction, legs) in attached.iter_enumerated() {
        let Some((first, rest)) = legs.split_first() else {
            continue;
        };
        for leg in rest {
            if leg.len() != first.len() {
                return Err(CompositionError::LegLengthMismatch {
                    junction: wiring.name_of(junction),
                    expected: first.len(),
                    found: leg.len(),
                });
            }
            for (a, b) in first.iter().zip(leg.iter()) {
                classes.union(a.index(), b.index());
            }
        }
    }

    let (apex, image) = quotient(&sum, &classes)?;
    let legs = wiring
        .outer_ports()
        .iter()
        .map(|&junction| {
            attached[junction]
                .first()
                .map(|leg| leg.map(|s| image[s.index()]))
                .ok_or_else(|| CompositionError::UnattachedJunction(wiring.name_of(junction)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(
        "composed {} boxes: {} species glued into {}, {} transitions, {} outer legs",
        bound.len(),
        sum.species_count(),
        apex.species_count(),
        apex.transition_count(),
        legs.len()
    );
    Ok(OpenNet { apex, legs })
}

fn bind<'w, 'n>(
    b: &'w WiringBox,
    nets: &'n IndexMap<String, OpenNet>,
) -> Result<(&'w WiringBox, &'n OpenNet), CompositionError> {
    let open = nets
        .get(&b.name)
        .ok_or_else(|| CompositionError::UnboundBox(b.name.clone()))?;
    if open.arity() != b.ports.len() {
        return Err(CompositionError::ArityMismatch {
            name: b.name.clone(),
            ports: b.ports.len(),
            legs: open.arity(),
        });
    }
    Ok((b, open))
}

impl OpenNet {
    /// Series composition: glues the right leg of `self` to the left leg of
    /// `other`. Both nets must have exactly two legs.
    pub fn then(&self, other: &OpenNet) -> Result<OpenNet, CompositionError> {
        let mut wiring = Wiring::new();
        wiring.add_junctions(["x", "y", "z"]);
        wiring.add_box("first", &["x", "y"])?;
        wiring.add_box("second", &["y", "z"])?;
        wiring.set_outer_ports(&["x", "z"])?;
        let nets = IndexMap::from([
            ("first".to_owned(), self.clone()),
            ("second".to_owned(), other.clone()),
        ]);
        compose(&wiring, &nets)
    }

    /// Parallel composition: the disjoint union with legs concatenated.
    pub fn oplus(&self, other: &OpenNet) -> Result<OpenNet, CompositionError> {
        let (apex, offsets) = coproduct([self.apex(), other.apex()])?;
        let legs = self
            .legs()
            .iter()
            .cloned()
            .chain(other.legs().iter().map(|leg| {
                leg.map(|s| SpeciesId::from_usize(s.index() + offsets[1]))
            }))
            .collect();
        Ok(OpenNet { apex, legs })
    }
}
