//! Logical netlist annotated by the physical design.
//!
//! Library cells, instances (cells, ports, modules), pins and nets. The
//! physical layer never creates logical objects; it only resolves names
//! against this structure and keys its attribute tables by these ids.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{PhysicalError, PhysicalResult};
use crate::ids::{EntityId, InstanceId, LibraryCellId, LibraryPinId, NetId, PinId};
use crate::library::PinDirection;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryCell {
    pub name: String,
    pub pins: Vec<LibraryPinId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryPin {
    pub name: String,
    pub cell: LibraryCellId,
    pub direction: PinDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstanceKind {
    Cell(LibraryCellId),
    Port(PinDirection),
    Module,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub kind: InstanceKind,
    pub pins: Vec<PinId>,
}

impl Instance {
    pub fn is_cell(&self) -> bool {
        matches!(self.kind, InstanceKind::Cell(_))
    }

    pub fn is_port(&self) -> bool {
        matches!(self.kind, InstanceKind::Port(_))
    }

    pub fn library_cell(&self) -> Option<LibraryCellId> {
        match self.kind {
            InstanceKind::Cell(lib) => Some(lib),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    pub name: String,
    pub instance: InstanceId,
    /// Set for pins of cell instances.
    pub library_pin: Option<LibraryPinId>,
    pub net: Option<NetId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Net {
    pub name: String,
    pub pins: Vec<PinId>,
}

/// A flat logical netlist with a single top module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Netlist {
    pub name: String,
    library_cells: Vec<LibraryCell>,
    library_pins: Vec<LibraryPin>,
    instances: Vec<Instance>,
    pins: Vec<Pin>,
    nets: Vec<Net>,
    library_cell_names: HashMap<String, LibraryCellId>,
    instance_names: HashMap<String, InstanceId>,
    net_names: HashMap<String, NetId>,
    top: InstanceId,
}

impl Netlist {
    /// Create a netlist whose top module is named `name`.
    pub fn new(name: &str) -> Self {
        let mut netlist = Self {
            name: name.to_string(),
            library_cells: Vec::new(),
            library_pins: Vec::new(),
            instances: Vec::new(),
            pins: Vec::new(),
            nets: Vec::new(),
            library_cell_names: HashMap::new(),
            instance_names: HashMap::new(),
            net_names: HashMap::new(),
            top: InstanceId::from_raw(0),
        };
        netlist.top = netlist.push_instance(name, InstanceKind::Module);
        netlist
    }

    // ── Library ──────────────────────────────────────────────────────

    /// Define a library cell with its ordered pins.
    pub fn add_library_cell(
        &mut self,
        name: &str,
        pins: &[(&str, PinDirection)],
    ) -> Option<LibraryCellId> {
        if self.library_cell_names.contains_key(name) {
            log::warn!("Library cell {} was already defined. Skipping ...", name);
            return None;
        }
        let id = LibraryCellId::from_index(self.library_cells.len());
        let mut pin_ids = Vec::with_capacity(pins.len());
        for (pin_name, direction) in pins {
            let pin_id = LibraryPinId::from_index(self.library_pins.len());
            self.library_pins.push(LibraryPin {
                name: pin_name.to_string(),
                cell: id,
                direction: *direction,
            });
            pin_ids.push(pin_id);
        }
        self.library_cells.push(LibraryCell {
            name: name.to_string(),
            pins: pin_ids,
        });
        self.library_cell_names.insert(name.to_string(), id);
        Some(id)
    }

    pub fn find_library_cell(&self, name: &str) -> Option<LibraryCellId> {
        self.library_cell_names.get(name).copied()
    }

    pub fn library_cell(&self, id: LibraryCellId) -> &LibraryCell {
        &self.library_cells[id.index()]
    }

    pub fn library_pin(&self, id: LibraryPinId) -> &LibraryPin {
        &self.library_pins[id.index()]
    }

    pub fn find_library_pin(&self, cell: LibraryCellId, name: &str) -> Option<LibraryPinId> {
        self.library_cell(cell)
            .pins
            .iter()
            .copied()
            .find(|&p| self.library_pin(p).name == name)
    }

    pub fn num_library_cells(&self) -> usize {
        self.library_cells.len()
    }

    pub fn num_library_pins(&self) -> usize {
        self.library_pins.len()
    }

    // ── Instances ────────────────────────────────────────────────────

    fn push_instance(&mut self, name: &str, kind: InstanceKind) -> InstanceId {
        let id = InstanceId::from_index(self.instances.len());
        self.instances.push(Instance {
            name: name.to_string(),
            kind,
            pins: Vec::new(),
        });
        self.instance_names.insert(name.to_string(), id);
        id
    }

    fn push_pin(&mut self, instance: InstanceId, name: &str, library_pin: Option<LibraryPinId>) -> PinId {
        let id = PinId::from_index(self.pins.len());
        self.pins.push(Pin {
            name: name.to_string(),
            instance,
            library_pin,
            net: None,
        });
        self.instances[instance.index()].pins.push(id);
        id
    }

    /// Instantiate a library cell; one pin is created per library pin.
    pub fn add_cell(&mut self, name: &str, library_cell: LibraryCellId) -> Option<InstanceId> {
        if self.instance_names.contains_key(name) {
            log::warn!("Instance {} was already defined. Skipping ...", name);
            return None;
        }
        let id = self.push_instance(name, InstanceKind::Cell(library_cell));
        let lib_pins = self.library_cell(library_cell).pins.clone();
        for lib_pin in lib_pins {
            let pin_name = self.library_pin(lib_pin).name.clone();
            self.push_pin(id, &pin_name, Some(lib_pin));
        }
        Some(id)
    }

    /// Add a top-level port; it owns exactly one pin.
    pub fn add_port(&mut self, name: &str, direction: PinDirection) -> Option<InstanceId> {
        if self.instance_names.contains_key(name) {
            log::warn!("Instance {} was already defined. Skipping ...", name);
            return None;
        }
        let id = self.push_instance(name, InstanceKind::Port(direction));
        self.push_pin(id, name, None);
        Some(id)
    }

    /// Add a pin on a module instance (the top module included).
    pub fn add_module_pin(&mut self, module: InstanceId, name: &str) -> Option<PinId> {
        if self.instances[module.index()].kind != InstanceKind::Module {
            log::warn!("Instance {} is not a module. Skipping pin {} ...", module, name);
            return None;
        }
        Some(self.push_pin(module, name, None))
    }

    pub fn top_module(&self) -> InstanceId {
        self.top
    }

    pub fn find_instance(&self, name: &str) -> Option<InstanceId> {
        self.instance_names.get(name).copied()
    }

    /// Find a cell instance by name.
    pub fn find_cell(&self, name: &str) -> Option<InstanceId> {
        self.find_instance(name)
            .filter(|&id| self.instance(id).is_cell())
    }

    /// Find a port instance by name.
    pub fn find_port(&self, name: &str) -> Option<InstanceId> {
        self.find_instance(name)
            .filter(|&id| self.instance(id).is_port())
    }

    pub fn instance(&self, id: InstanceId) -> &Instance {
        &self.instances[id.index()]
    }

    pub fn get_instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(id.index())
    }

    pub fn all_instances(&self) -> impl Iterator<Item = (InstanceId, &Instance)> {
        self.instances
            .iter()
            .enumerate()
            .map(|(i, inst)| (InstanceId::from_index(i), inst))
    }

    pub fn num_instances(&self) -> usize {
        self.instances.len()
    }

    pub fn num_ports(&self) -> usize {
        self.instances.iter().filter(|i| i.is_port()).count()
    }

    // ── Pins and nets ────────────────────────────────────────────────

    pub fn pin(&self, id: PinId) -> &Pin {
        &self.pins[id.index()]
    }

    pub fn get_pin(&self, id: PinId) -> Option<&Pin> {
        self.pins.get(id.index())
    }

    pub fn find_pin(&self, instance: InstanceId, name: &str) -> Option<PinId> {
        self.instance(instance)
            .pins
            .iter()
            .copied()
            .find(|&p| self.pin(p).name == name)
    }

    pub fn num_pins(&self) -> usize {
        self.pins.len()
    }

    pub fn add_net(&mut self, name: &str) -> Option<NetId> {
        if self.net_names.contains_key(name) {
            log::warn!("Net {} was already defined. Skipping ...", name);
            return None;
        }
        let id = NetId::from_index(self.nets.len());
        self.nets.push(Net {
            name: name.to_string(),
            pins: Vec::new(),
        });
        self.net_names.insert(name.to_string(), id);
        Some(id)
    }

    /// Attach `pin` to `net`, appending it to the net's pin order.
    pub fn connect(&mut self, net: NetId, pin: PinId) -> PhysicalResult<()> {
        let slot = &mut self.pins[pin.index()].net;
        if slot.is_some() {
            return Err(PhysicalError::PinAlreadyConnected(pin));
        }
        *slot = Some(net);
        self.nets[net.index()].pins.push(pin);
        Ok(())
    }

    pub fn find_net(&self, name: &str) -> Option<NetId> {
        self.net_names.get(name).copied()
    }

    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.index()]
    }

    pub fn get_net(&self, id: NetId) -> Option<&Net> {
        self.nets.get(id.index())
    }

    pub fn all_nets(&self) -> impl Iterator<Item = NetId> {
        (0..self.nets.len()).map(NetId::from_index)
    }

    pub fn num_nets(&self) -> usize {
        self.nets.len()
    }
}
