//! Undirected wiring diagrams: boxes whose ports are bound to shared junctions.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::net::ids::define_id;
use crate::net::index_vec::IndexVec;
use crate::open::CompositionError;

define_id!(JunctionId, "j");
define_id!(BoxId, "b");

/// One box of a wiring diagram. Port `i` is glued along leg `i` of the open
/// net bound to the box.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct WiringBox {
    pub name: String,
    pub ports: Vec<JunctionId>,
}

#[derive(Serialize, Deserialize)]
struct WiringRepr {
    junctions: Vec<String>,
    boxes: Vec<BoxRepr>,
    #[serde(default)]
    outer_ports: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct BoxRepr {
    name: String,
    ports: Vec<String>,
}

/// Junctions, boxes and outer ports of a composition.
///
/// Junctions are referred to by name while building; an undeclared name is an
/// [`CompositionError::UnknownPort`].
#[derive(Clone, Default, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "WiringRepr", into = "WiringRepr")]
pub struct Wiring {
    junctions: IndexVec<JunctionId, String>,
    junction_ids: IndexMap<String, JunctionId>,
    boxes: IndexVec<BoxId, WiringBox>,
    outer_ports: Vec<JunctionId>,
}

impl Wiring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a junction. Declaring an existing name returns its id.
    pub fn add_junction(&mut self, name: impl Into<String>) -> JunctionId {
        let name = name.into();
        if let Some(&id) = self.junction_ids.get(&name) {
            return id;
        }
        let id = self.junctions.push(name.clone());
        self.junction_ids.insert(name, id);
        id
    }

    pub fn add_junctions<S: Into<String>>(
        &mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Vec<JunctionId> {
        names.into_iter().map(|name| self.add_junction(name)).collect()
    }

    /// Adds a box whose ports are bound, in order, to the named junctions.
    pub fn add_box<S: AsRef<str>>(
        &mut self,
        name: impl Into<String>,
        ports: &[S],
    ) -> Result<BoxId, CompositionError> {
        let name = name.into();
        if self.boxes.iter().any(|b| b.name == name) {
            return Err(CompositionError::DuplicateBox(name));
        }
        let ports = self.resolve(ports)?;
        Ok(self.boxes.push(WiringBox { name, ports }))
    }

    /// Junctions exposed by the composite, in leg order.
    pub fn set_outer_ports<S: AsRef<str>>(&mut self, ports: &[S]) -> Result<(), CompositionError> {
        self.outer_ports = self.resolve(ports)?;
        Ok(())
    }

    pub fn junction(&self, name: &str) -> Option<JunctionId> {
        self.junction_ids.get(name).copied()
    }

    pub fn junction_name(&self, junction: JunctionId) -> Option<&str> {
        self.junctions.get(junction).map(String::as_str)
    }

    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    pub fn junctions(&self) -> impl Iterator<Item = (JunctionId, &str)> {
        self.junctions
            .iter_enumerated()
            .map(|(id, name)| (id, name.as_str()))
    }

    pub fn boxes(&self) -> impl Iterator<Item = (BoxId, &WiringBox)> {
        self.boxes.iter_enumerated()
    }

    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    pub fn outer_ports(&self) -> &[JunctionId] {
        &self.outer_ports
    }

    fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<JunctionId>, CompositionError> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.junction(name)
                    .ok_or_else(|| CompositionError::UnknownPort(name.to_owned()))
            })
            .collect()
    }

    pub(crate) fn name_of(&self, junction: JunctionId) -> String {
        self.junctions[junction].clone()
    }
}

impl TryFrom<WiringRepr> for Wiring {
    type Error = CompositionError;

    fn try_from(repr: WiringRepr) -> Result<Self, Self::Error> {
        let mut wiring = Wiring::new();
        wiring.add_junctions(repr.junctions);
        for b in repr.boxes {
            wiring.add_box(b.name, &b.ports)?;
        }
        wiring.set_outer_ports(&repr.outer_ports)?;
        Ok(wiring)
    }
}

impl From<Wiring> for WiringRepr {
    fn from(wiring: Wiring) -> Self {
        let boxes = wiring
            .boxes
            .iter()
            .map(|b| BoxRepr {
                name: b.name.clone(),
                ports: b.ports.iter().map(|&j| wiring.name_of(j)).collect(),
            })
            .collect();
        let outer_ports = wiring.outer_ports.iter().map(|&j| wiring.name_of(j)).collect();
        WiringRepr {
            junctions: wiring.junctions.iter().cloned().collect(),
            boxes,
            outer_ports,
        }
    }
}
