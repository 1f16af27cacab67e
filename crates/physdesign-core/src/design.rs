use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PhysicalConfig;
use crate::error::{PhysicalError, PhysicalResult};
use crate::floorplan::{PhysicalDie, PhysicalGroup, PhysicalRegion, PhysicalRow};
use crate::geometry::{Boundary, Bounds, Dbu, DbuXy, Dimension};
use crate::ids::{
    EntityId, GroupId, InstanceId, LibraryCellId, LibraryPinId, NetId, PinId, RegionId, RowId,
    SiteId, ViaId,
};
use crate::instance::{PhysicalInstance, PhysicalInstanceKind, PhysicalPin};
use crate::layer::{LayerStack, PhysicalSpacing};
use crate::library::{PhysicalLibraryCell, PhysicalLibraryPin, PhysicalSite, PhysicalVia};
use crate::net::PhysicalNet;
use crate::netlist::Netlist;
use crate::observer::{ObserverHandle, ObserverList};
use crate::registry::{AttributeTable, NamedRegistry};
use crate::spatial::{SpatialEntry, SpatialIndex};
use crate::units::DbuRegistry;

/// Buckets for the area and element-count aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicalType {
    Fixed,
    Movable,
    Block,
    Port,
    Placeable,
    /// Rectangles of the primary-layer obstacles of fixed cells.
    FixedBounds,
}

impl PhysicalType {
    pub const COUNT: usize = 6;
    pub const ALL: [PhysicalType; PhysicalType::COUNT] = [
        PhysicalType::Fixed,
        PhysicalType::Movable,
        PhysicalType::Block,
        PhysicalType::Port,
        PhysicalType::Placeable,
        PhysicalType::FixedBounds,
    ];

    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

/// The physical design database.
///
/// Annotates a logical [`Netlist`] with technology data, placement and
/// routing geometry. All stored coordinates are in library database units.
#[derive(Debug)]
pub struct PhysicalDesign {
    /// Session identifier.
    pub(crate) id: Uuid,
    pub(crate) config: PhysicalConfig,
    pub(crate) netlist: Netlist,
    pub(crate) units: DbuRegistry,

    // ── Technology ───────────────────────────────────────────────────
    pub(crate) sites: NamedRegistry<SiteId, PhysicalSite>,
    pub(crate) layers: LayerStack,
    pub(crate) vias: NamedRegistry<ViaId, PhysicalVia>,
    pub(crate) spacings: Vec<PhysicalSpacing>,
    pub(crate) library_cells: AttributeTable<LibraryCellId, PhysicalLibraryCell>,
    pub(crate) library_pins: AttributeTable<LibraryPinId, PhysicalLibraryPin>,

    // ── Floorplan ────────────────────────────────────────────────────
    pub(crate) rows: Vec<PhysicalRow>,
    pub(crate) regions: NamedRegistry<RegionId, PhysicalRegion>,
    pub(crate) groups: NamedRegistry<GroupId, PhysicalGroup>,
    pub(crate) die: PhysicalDie,

    // ── Placement and routing ────────────────────────────────────────
    pub(crate) instances: AttributeTable<InstanceId, PhysicalInstance>,
    /// Present only when physical pins are enabled.
    pub(crate) pins: Option<AttributeTable<PinId, PhysicalPin>>,
    pub(crate) nets: AttributeTable<NetId, PhysicalNet>,
    pub(crate) clock_net: Option<NetId>,
    /// Sum of every net's bounding-box lengths.
    pub(crate) hpwl: DbuXy,
    pub(crate) areas: [Dbu; PhysicalType::COUNT],
    pub(crate) counts: [usize; PhysicalType::COUNT],
    pub(crate) design_loaded: bool,
    dirty_nets: BTreeSet<NetId>,
    observers: ObserverList,
}

impl PhysicalDesign {
    pub fn new(netlist: Netlist, config: PhysicalConfig) -> Self {
        let pins = config
            .enable_physical_pins
            .then(|| AttributeTable::with_capacity(netlist.num_pins()));
        log::debug!(
            "Physical design created for '{}' (physical pins: {}, merge rectangles: {}, net pin boundaries: {})",
            netlist.name,
            config.enable_physical_pins,
            config.enable_merge_rectangles,
            config.enable_net_pin_boundaries
        );
        Self {
            id: Uuid::new_v4(),
            config,
            units: DbuRegistry::default(),
            sites: NamedRegistry::new("Site"),
            layers: LayerStack::new(),
            vias: NamedRegistry::new("Via"),
            spacings: Vec::new(),
            library_cells: AttributeTable::with_capacity(netlist.num_library_cells()),
            library_pins: AttributeTable::with_capacity(netlist.num_library_pins()),
            rows: Vec::new(),
            regions: NamedRegistry::new("Region"),
            groups: NamedRegistry::new("Group"),
            die: PhysicalDie::default(),
            instances: AttributeTable::with_capacity(netlist.num_instances()),
            pins,
            nets: AttributeTable::with_capacity(netlist.num_nets()),
            clock_net: None,
            hpwl: DbuXy::default(),
            areas: [0; PhysicalType::COUNT],
            counts: [0; PhysicalType::COUNT],
            design_loaded: false,
            dirty_nets: BTreeSet::new(),
            observers: ObserverList::new(),
            netlist,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &PhysicalConfig {
        &self.config
    }

    pub fn netlist(&self) -> &Netlist {
        &self.netlist
    }

    pub fn units(&self) -> &DbuRegistry {
        &self.units
    }

    pub fn is_design_loaded(&self) -> bool {
        self.design_loaded
    }

    // ── Technology ───────────────────────────────────────────────────

    pub fn site(&self, id: SiteId) -> Option<&PhysicalSite> {
        self.sites.get(id)
    }

    pub fn site_by_name(&self, name: &str) -> Option<&PhysicalSite> {
        self.sites.get_by_name(name)
    }

    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn via(&self, id: ViaId) -> Option<&PhysicalVia> {
        self.vias.get(id)
    }

    pub fn via_by_name(&self, name: &str) -> Option<&PhysicalVia> {
        self.vias.get_by_name(name)
    }

    pub fn num_vias(&self) -> usize {
        self.vias.len()
    }

    pub fn spacings(&self) -> &[PhysicalSpacing] {
        &self.spacings
    }

    pub fn library_cell(&self, id: LibraryCellId) -> Option<&PhysicalLibraryCell> {
        self.library_cells.get(id)
    }

    pub fn library_pin(&self, id: LibraryPinId) -> Option<&PhysicalLibraryPin> {
        self.library_pins.get(id)
    }

    // ── Floorplan ────────────────────────────────────────────────────

    pub fn rows(&self) -> &[PhysicalRow] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&PhysicalRow> {
        self.rows.get(id.index())
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Height of the first row.
    pub fn row_height(&self) -> Option<Dbu> {
        self.rows.first().map(PhysicalRow::height)
    }

    /// Site width of the first row.
    pub fn row_site_width(&self) -> Option<Dbu> {
        self.rows.first().map(|row| row.step.x)
    }

    pub fn region(&self, id: RegionId) -> Option<&PhysicalRegion> {
        self.regions.get(id)
    }

    pub fn region_by_name(&self, name: &str) -> Option<&PhysicalRegion> {
        self.regions.get_by_name(name)
    }

    pub fn num_regions(&self) -> usize {
        self.regions.len()
    }

    pub fn group(&self, id: GroupId) -> Option<&PhysicalGroup> {
        self.groups.get(id)
    }

    pub fn group_by_name(&self, name: &str) -> Option<&PhysicalGroup> {
        self.groups.get_by_name(name)
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn die(&self) -> &PhysicalDie {
        &self.die
    }

    // ── Instances, pins and nets ─────────────────────────────────────

    pub fn instance(&self, id: InstanceId) -> Option<&PhysicalInstance> {
        self.instances.get(id)
    }

    pub fn instances(&self) -> impl Iterator<Item = (InstanceId, &PhysicalInstance)> {
        self.instances.iter()
    }

    /// The per-pin record; `None` when physical pins are disabled.
    pub fn physical_pin(&self, pin: PinId) -> Option<&PhysicalPin> {
        self.pins.as_ref().and_then(|pins| pins.get(pin))
    }

    pub fn net(&self, id: NetId) -> Option<&PhysicalNet> {
        self.nets.get(id)
    }

    pub fn nets(&self) -> impl Iterator<Item = (NetId, &PhysicalNet)> {
        self.nets.iter()
    }

    pub fn set_clock_net(&mut self, net: Option<NetId>) {
        self.clock_net = net;
    }

    pub fn clock_net(&self) -> Option<NetId> {
        self.clock_net
    }

    /// Offset of `pin` from its instance's lower corner.
    ///
    /// Taken from the per-pin record when present, otherwise from the
    /// library pin. Pins without a library counterpart have no offset.
    pub fn pin_displacement(&self, pin: PinId) -> DbuXy {
        if let Some(record) = self.physical_pin(pin) {
            return record.displacement;
        }
        self.netlist
            .get_pin(pin)
            .and_then(|p| p.library_pin)
            .and_then(|lib_pin| self.library_pins.get(lib_pin))
            .map(PhysicalLibraryPin::displacement)
            .unwrap_or_default()
    }

    /// Absolute pin position, or `None` if its instance has no geometry.
    pub fn pin_position(&self, pin: PinId) -> Option<DbuXy> {
        let instance = self.instances.get(self.netlist.get_pin(pin)?.instance)?;
        Some(instance.position() + self.pin_displacement(pin))
    }

    /// Pin position used by placers that treat standard cells as points.
    ///
    /// Pins of macro blocks keep their real offset; pins of every other
    /// instance sit at the instance's lower corner.
    pub fn relaxed_pin_position(&self, pin: PinId) -> Option<DbuXy> {
        let instance = self.instances.get(self.netlist.get_pin(pin)?.instance)?;
        if instance.block {
            Some(instance.position() + self.pin_displacement(pin))
        } else {
            Some(instance.position())
        }
    }

    // ── Net bounds ───────────────────────────────────────────────────

    /// Recompute the bounding box of `net` and patch the total HPWL.
    ///
    /// Nets without pins and unknown nets are left untouched. Pins whose
    /// instance has no geometry are ignored. On ties the last pin in net
    /// order becomes the boundary pin.
    pub fn update_net_bound(&mut self, net: NetId) {
        let Some(logical) = self.netlist.get_net(net) else {
            log::warn!("Net {} is not in the netlist. Skipping bound update ...", net);
            return;
        };
        let pins = &logical.pins;
        if pins.is_empty() {
            return;
        }
        if !self.nets.contains(net) {
            log::warn!("Net {} has no physical record. Skipping bound update ...", net);
            return;
        }

        let track = self.config.enable_net_pin_boundaries;
        let mut bounds = Bounds::empty();
        let mut extremes: [[Option<PinId>; 2]; 2] = [[None; 2]; 2];
        let mut scanned = 0usize;
        for &pin in pins {
            let Some(pos) = self.pin_position(pin) else {
                continue;
            };
            scanned += 1;
            for (d, dim) in Dimension::ALL.into_iter().enumerate() {
                if pos[dim] >= bounds.upper[dim] {
                    bounds.upper[dim] = pos[dim];
                    extremes[1][d] = Some(pin);
                }
                if pos[dim] <= bounds.lower[dim] {
                    bounds.lower[dim] = pos[dim];
                    extremes[0][d] = Some(pin);
                }
            }
        }
        if scanned == 0 {
            bounds = Bounds::default();
        }

        let Some(record) = self.nets.get_mut(net) else {
            return;
        };
        self.hpwl -= record.hpwl();
        record.bounds = bounds;
        if track && scanned > 0 {
            for (b, boundary) in Boundary::ALL.into_iter().enumerate() {
                for (d, dim) in Dimension::ALL.into_iter().enumerate() {
                    if let Some(pin) = extremes[b][d] {
                        record.set_bound_pin(boundary, dim, pin);
                    }
                }
            }
        }
        self.hpwl += record.hpwl();
    }

    /// Recompute every net's bound.
    ///
    /// With `skip_clock` the clock net's previous contribution is removed
    /// from the total and the net itself is not recomputed, so the total
    /// then excludes it.
    pub fn update_all_net_bounds(&mut self, skip_clock: bool) {
        let skipped = if skip_clock { self.clock_net } else { None };
        if let Some(clock) = skipped {
            if let Some(record) = self.nets.get(clock) {
                self.hpwl -= record.hpwl();
            }
        }
        for index in 0..self.netlist.num_nets() {
            let net = NetId::from_index(index);
            if Some(net) == skipped {
                continue;
            }
            self.update_net_bound(net);
        }
        self.dirty_nets.clear();
    }

    /// Queue every net touching `instance` for [`Self::update_dirty_net_bounds`].
    pub fn mark_instance_dirty(&mut self, instance: InstanceId) {
        let Some(logical) = self.netlist.get_instance(instance) else {
            log::warn!("Instance {} is not in the netlist. Skipping ...", instance);
            return;
        };
        let nets = logical
            .pins
            .iter()
            .filter_map(|&pin| self.netlist.get_pin(pin).and_then(|p| p.net));
        self.dirty_nets.extend(nets);
    }

    /// Recompute the bounds of queued nets. Returns how many were updated.
    pub fn update_dirty_net_bounds(&mut self) -> usize {
        let dirty = std::mem::take(&mut self.dirty_nets);
        let count = dirty.len();
        for net in dirty {
            self.update_net_bound(net);
        }
        count
    }

    pub fn num_dirty_nets(&self) -> usize {
        self.dirty_nets.len()
    }

    // ── Placement ────────────────────────────────────────────────────

    /// Move a cell so that its lower corner lands on `(x, y)`.
    ///
    /// Returns whether the position changed. Observers run only after a
    /// real move and only if `suppress_observers` is off. Net bounds are
    /// not refreshed here.
    pub fn place_cell(
        &mut self,
        cell: InstanceId,
        x: Dbu,
        y: Dbu,
        suppress_observers: bool,
    ) -> PhysicalResult<bool> {
        let instance = self
            .instances
            .get_mut(cell)
            .ok_or(PhysicalError::NoPhysicalInstance(cell))?;
        if instance.kind != PhysicalInstanceKind::Cell {
            return Err(PhysicalError::NotACell(cell));
        }
        let previous = instance.position();
        instance.bounds.move_to(x, y);
        let moved = previous != instance.position();

        if moved && !suppress_observers {
            if let Some(instance) = self.instances.get(cell) {
                self.observers.notify(cell, instance, None);
            }
        }
        Ok(moved)
    }

    pub fn place_cell_at(
        &mut self,
        cell: InstanceId,
        position: DbuXy,
        suppress_observers: bool,
    ) -> PhysicalResult<bool> {
        self.place_cell(cell, position.x, position.y, suppress_observers)
    }

    /// Register an observer for cell moves.
    ///
    /// Observers run in ascending `priority`; equal priorities run in
    /// registration order.
    pub fn add_post_instance_moved_callback(
        &mut self,
        priority: i32,
        callback: impl FnMut(InstanceId, &PhysicalInstance) + 'static,
    ) -> ObserverHandle {
        self.observers.add(priority, Box::new(callback))
    }

    pub fn remove_post_instance_moved_callback(&mut self, handle: ObserverHandle) -> bool {
        self.observers.remove(handle)
    }

    pub fn num_observers(&self) -> usize {
        self.observers.len()
    }

    /// Run every observer for `instance`, e.g. after a batch of
    /// suppressed moves.
    pub fn notify_observers(&mut self, instance: InstanceId) -> PhysicalResult<()> {
        self.notify(instance, None)
    }

    /// Run every observer except `skip`.
    pub fn notify_observers_except(
        &mut self,
        instance: InstanceId,
        skip: ObserverHandle,
    ) -> PhysicalResult<()> {
        self.notify(instance, Some(skip))
    }

    fn notify(&mut self, id: InstanceId, skip: Option<ObserverHandle>) -> PhysicalResult<()> {
        let instance = self
            .instances
            .get(id)
            .ok_or(PhysicalError::NoPhysicalInstance(id))?;
        self.observers.notify(id, instance, skip);
        Ok(())
    }

    // ── Aggregates ───────────────────────────────────────────────────

    pub fn area(&self, ty: PhysicalType) -> Dbu {
        self.areas[ty.slot()]
    }

    pub fn num_elements(&self, ty: PhysicalType) -> usize {
        self.counts[ty.slot()]
    }

    /// Total half-perimeter wirelength per dimension.
    pub fn hpwl(&self) -> DbuXy {
        self.hpwl
    }

    pub fn hpwl_along(&self, dim: Dimension) -> Dbu {
        self.hpwl[dim]
    }

    pub fn total_hpwl(&self) -> Dbu {
        self.hpwl.aggregated()
    }

    /// Movable standard cells no longer at their loaded position.
    pub fn num_moved_cells(&self) -> usize {
        self.instances
            .iter()
            .filter(|(_, inst)| {
                inst.kind == PhysicalInstanceKind::Cell && !inst.fixed && !inst.block && inst.has_moved()
            })
            .count()
    }

    /// Adjust the area buckets for an instance by `delta`.
    pub(crate) fn account_area(&mut self, instance: &PhysicalInstance, delta: Dbu) {
        if instance.block {
            self.areas[PhysicalType::Block.slot()] += delta;
        }
        let bucket = match (instance.fixed, instance.kind) {
            (true, PhysicalInstanceKind::Port) => PhysicalType::Port,
            (true, _) => PhysicalType::Fixed,
            (false, _) => PhysicalType::Movable,
        };
        self.areas[bucket.slot()] += delta;
    }

    // ── Spatial queries ──────────────────────────────────────────────

    /// Index over the current rectangles of macro blocks.
    pub fn build_macro_index(&self) -> SpatialIndex {
        let entries = self
            .instances
            .iter()
            .filter(|(_, inst)| inst.kind == PhysicalInstanceKind::Cell && inst.block)
            .map(|(instance, inst)| SpatialEntry {
                instance,
                bounds: inst.bounds,
            })
            .collect();
        SpatialIndex::build(entries)
    }

    /// Movable standard cells whose rectangle overlaps a macro block.
    pub fn cells_overlapping_macros(&self) -> Vec<InstanceId> {
        let index = self.build_macro_index();
        if index.is_empty() {
            return Vec::new();
        }
        self.instances
            .iter()
            .filter(|(_, inst)| {
                inst.kind == PhysicalInstanceKind::Cell && !inst.fixed && !inst.block
            })
            .filter(|(_, inst)| !index.query_overlapping(&inst.bounds).is_empty())
            .map(|(id, _)| id)
            .collect()
    }

    // ── Reporting ────────────────────────────────────────────────────

    pub fn summary(&self) -> DesignSummary {
        DesignSummary {
            session: self.id,
            name: self.netlist.name.clone(),
            library_dbu: self.units.library(),
            design_dbu: self.units.design(),
            multiplier: self.units.multiplier(),
            num_layers: self.layers.layer_count(),
            num_sites: self.sites.len(),
            num_vias: self.vias.len(),
            num_rows: self.rows.len(),
            num_instances: self.instances.len(),
            num_nets: self.nets.len(),
            num_moved_cells: self.num_moved_cells(),
            die: self.die.bounds,
            hpwl: self.hpwl,
            total_hpwl: self.total_hpwl(),
            fixed_area: self.area(PhysicalType::Fixed),
            movable_area: self.area(PhysicalType::Movable),
            block_area: self.area(PhysicalType::Block),
            port_area: self.area(PhysicalType::Port),
            placeable_area: self.area(PhysicalType::Placeable),
            num_fixed: self.num_elements(PhysicalType::Fixed),
            num_movable: self.num_elements(PhysicalType::Movable),
            num_blocks: self.num_elements(PhysicalType::Block),
            num_ports: self.num_elements(PhysicalType::Port),
            num_fixed_bounds: self.num_elements(PhysicalType::FixedBounds),
        }
    }
}

/// Snapshot of the design-wide aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignSummary {
    pub session: Uuid,
    pub name: String,
    pub library_dbu: Dbu,
    pub design_dbu: Dbu,
    pub multiplier: Dbu,
    pub num_layers: usize,
    pub num_sites: usize,
    pub num_vias: usize,
    pub num_rows: usize,
    pub num_instances: usize,
    pub num_nets: usize,
    pub num_moved_cells: usize,
    pub die: Bounds,
    pub hpwl: DbuXy,
    pub total_hpwl: Dbu,
    pub fixed_area: Dbu,
    pub movable_area: Dbu,
    pub block_area: Dbu,
    pub port_area: Dbu,
    pub placeable_area: Dbu,
    pub num_fixed: usize,
    pub num_movable: usize,
    pub num_blocks: usize,
    pub num_ports: usize,
    pub num_fixed_bounds: usize,
}

impl DesignSummary {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
