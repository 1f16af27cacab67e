//! Library and design ingestion.
//!
//! Both entry points validate every name a record refers to before the
//! database is touched, so a fatal error leaves the design as it was.

use crate::descriptor::{
    ComponentDescriptor, DesignDescriptor, DoubleRect, IoPortDescriptor, LayerDescriptor,
    LibraryDescriptor, MacroDescriptor, NetDescriptor, RowDescriptor, SiteDescriptor,
    SpacingDescriptor, ViaDescriptor,
};
use crate::design::{PhysicalDesign, PhysicalType};
use crate::error::{PhysicalError, PhysicalResult};
use crate::floorplan::{PhysicalGroup, PhysicalRegion, PhysicalRow, RegionType};
use crate::geometry::{Bounds, Dbu, DbuXy, Dimension, Polygon};
use crate::ids::{EntityId, InstanceId, LayerId, NetId, RowId, SpacingId};
use crate::instance::{Orientation, PhysicalInstance, PhysicalInstanceKind, PhysicalPin};
use crate::layer::{LayerDirection, LayerType, PhysicalSpacing};
use crate::library::{
    MacroClass, PhysicalLibraryCell, PhysicalLibraryPin, PhysicalObstacle, PhysicalSite,
    PhysicalVia, PhysicalViaLayer, PinDirection, SiteClass,
};
use crate::merge::merge_bounds;
use crate::net::{extend_path, PhysicalNet, PhysicalViaInstance, PhysicalWire, PhysicalWireSegment};
use crate::units::{rect_to_dbu, to_dbu, xy_to_dbu};

/// Database units per micron assumed when no library declares any.
pub const DEFAULT_LIBRARY_DBU: Dbu = 100;

impl PhysicalDesign {
    // ── Library ──────────────────────────────────────────────────────

    /// Add the sites, layers, vias, spacings and cell masters of a
    /// library.
    ///
    /// A library whose resolution differs from the first one loaded is
    /// skipped with a warning. Macros and macro pins must name existing
    /// logical library cells and pins.
    pub fn load_library(&mut self, library: &LibraryDescriptor) -> PhysicalResult<()> {
        let resolution = match library.database_units {
            Some(resolution) => resolution,
            None if self.units.library() == 0 => {
                log::info!(
                    "Library declares no database units. Assuming {} per micron.",
                    DEFAULT_LIBRARY_DBU
                );
                DEFAULT_LIBRARY_DBU
            }
            None => self.units.library(),
        };
        if !self.units.accepts_library(resolution) {
            log::warn!(
                "Library database units {} differ from the loaded ones ({}).",
                resolution,
                self.units.library()
            );
            log::warn!("Library elements were NOT initialized!");
            return Ok(());
        }

        self.validate_library(library)?;
        self.units.set_library(resolution);

        self.sites.reserve(library.sites.len());
        self.layers.reserve(library.layers.len());
        self.vias.reserve(library.vias.len());
        self.spacings.reserve(library.spacings.len());

        for site in &library.sites {
            self.add_physical_site(site, resolution);
        }
        for layer in &library.layers {
            self.add_physical_layer(layer, resolution);
        }
        for via in &library.vias {
            self.add_physical_via(via, resolution);
        }
        for spacing in &library.spacings {
            self.add_physical_spacing(spacing, resolution);
        }
        for macro_def in &library.macros {
            self.add_physical_library_cell(macro_def, resolution);
        }

        log::info!(
            "Library loaded: {} sites, {} layers, {} vias, {} spacings, {} macros",
            library.sites.len(),
            library.layers.len(),
            library.vias.len(),
            library.spacings.len(),
            library.macros.len()
        );
        Ok(())
    }

    fn validate_library(&self, library: &LibraryDescriptor) -> PhysicalResult<()> {
        for macro_def in &library.macros {
            let cell = self
                .netlist
                .find_library_cell(&macro_def.name)
                .ok_or_else(|| PhysicalError::UndefinedLibraryCell(macro_def.name.clone()))?;
            for pin in &macro_def.pins {
                if self.netlist.find_library_pin(cell, &pin.name).is_none() {
                    return Err(PhysicalError::UndefinedLibraryPin {
                        cell: macro_def.name.clone(),
                        pin: pin.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn add_physical_site(&mut self, site: &SiteDescriptor, resolution: Dbu) {
        self.sites.insert_with(&site.name, |id| PhysicalSite {
            id,
            name: site.name.clone(),
            size: xy_to_dbu(site.size, resolution),
            class: SiteClass::from_name(&site.class),
        });
    }

    fn add_physical_layer(&mut self, layer: &LayerDescriptor, resolution: Dbu) {
        self.layers.add_layer(
            &layer.name,
            LayerType::from_name(&layer.layer_type),
            LayerDirection::from_name(&layer.direction),
            to_dbu(layer.pitch, resolution),
            to_dbu(layer.spacing, resolution),
            to_dbu(layer.width, resolution),
        );
    }

    fn add_physical_via(&mut self, via: &ViaDescriptor, resolution: Dbu) {
        let layers: Vec<PhysicalViaLayer> = via
            .layers
            .iter()
            .map(|via_layer| PhysicalViaLayer {
                layer: self.resolve_layer(&via_layer.layer, &via.name),
                bounds: self.shapes_to_dbu(&via_layer.rects, resolution),
            })
            .collect();
        self.vias.insert_with(&via.name, |id| PhysicalVia {
            id,
            name: via.name.clone(),
            layers,
        });
    }

    fn add_physical_spacing(&mut self, spacing: &SpacingDescriptor, resolution: Dbu) {
        let owner = format!("spacing {}", self.spacings.len());
        let layer1 = self.resolve_layer(&spacing.layer1, &owner);
        let layer2 = self.resolve_layer(&spacing.layer2, &owner);
        self.spacings.push(PhysicalSpacing {
            id: SpacingId::from_index(self.spacings.len()),
            layer1,
            layer2,
            distance: to_dbu(spacing.distance, resolution),
        });
    }

    fn add_physical_library_cell(&mut self, macro_def: &MacroDescriptor, resolution: Dbu) {
        let Some(cell) = self.netlist.find_library_cell(&macro_def.name) else {
            return;
        };
        if self.library_cells.contains(cell) {
            log::warn!("Macro {} was already defined. Skipping ...", macro_def.name);
            return;
        }

        let primary = self.layers.lowest_routing_layer();
        let mut obstacles = Vec::with_capacity(macro_def.obstacles.len());
        let mut layer_bound_index = None;
        for (id, obstacle) in macro_def.obstacles.iter().enumerate() {
            let layer = self.resolve_layer(&obstacle.layer, &macro_def.name);
            if layer.is_some() && layer == primary {
                layer_bound_index = Some(id);
            }
            obstacles.push(PhysicalObstacle {
                id,
                layer,
                bounds: self.shapes_to_dbu(&obstacle.rects, resolution),
            });
        }
        self.library_cells.insert(
            cell,
            PhysicalLibraryCell {
                size: xy_to_dbu(macro_def.size, resolution),
                macro_class: MacroClass::from_name(&macro_def.class),
                obstacles,
                layer_bound_index,
            },
        );

        for pin in &macro_def.pins {
            let Some(lib_pin) = self.netlist.find_library_pin(cell, &pin.name) else {
                continue;
            };
            let direction = match PinDirection::from_name(&pin.direction) {
                PinDirection::Invalid => self.netlist.library_pin(lib_pin).direction,
                direction => direction,
            };
            let mut record = PhysicalLibraryPin::new(direction);
            for port in &pin.ports {
                let layer = self.resolve_layer(&port.layer, &macro_def.name);
                let bounds = self.shapes_to_dbu(&port.rects, resolution);
                let polygons = port
                    .polygons
                    .iter()
                    .map(|points| {
                        Polygon::new(points.iter().map(|&p| xy_to_dbu(p, resolution)).collect())
                    })
                    .collect();
                record.add_port(layer, bounds, polygons);
            }
            self.library_pins.insert(lib_pin, record);
        }
    }

    /// Convert micron rectangles, merging them when enabled.
    fn shapes_to_dbu(&self, rects: &[DoubleRect], resolution: Dbu) -> Vec<Bounds> {
        let bounds: Vec<Bounds> = rects
            .iter()
            .map(|rect| rect_to_dbu(rect.lower, rect.upper, resolution))
            .collect();
        if self.config.enable_merge_rectangles && bounds.len() > 1 {
            merge_bounds(&bounds, Dimension::X)
        } else {
            bounds
        }
    }

    fn resolve_layer(&self, name: &str, owner: &str) -> Option<LayerId> {
        if name.is_empty() {
            return None;
        }
        let id = self.layers.layer_id(name);
        if id.is_none() {
            log::warn!("Layer {} used by {} was not defined.", name, owner);
        }
        id
    }

    // ── Design ───────────────────────────────────────────────────────

    /// Place components and ports, and add rows, regions, groups, routed
    /// nets and the die.
    ///
    /// Runs once per session; later calls only warn. The design resolution
    /// must evenly divide the library resolution and every referenced name
    /// must resolve, otherwise nothing is loaded.
    pub fn load_design(&mut self, design: &DesignDescriptor) -> PhysicalResult<()> {
        if self.design_loaded {
            log::warn!("Design was already loaded. Skipping ...");
            return Ok(());
        }
        if let Err(err) = self.units.check_design(design.database_units) {
            log::error!("{}", err);
            return Err(err);
        }
        self.validate_design(design)?;

        let multiplier = self.units.set_design(design.database_units)?;
        self.design_loaded = true;
        self.die.bounds = design.die.scale(multiplier);

        for component in &design.components {
            self.add_physical_cell(component, multiplier);
        }
        for port in &design.ports {
            self.add_physical_port(port, multiplier);
        }

        let top = self.netlist.top_module();
        let mut module = PhysicalInstance::new(PhysicalInstanceKind::Module, Bounds::empty());
        module.fixed = true;
        self.instances.insert(top, module);
        for row in &design.rows {
            self.add_physical_row(row)?;
        }
        if let Some(module) = self.instances.get_mut(top) {
            if module.bounds.is_empty() {
                module.bounds = self.die.bounds;
            }
        }

        for region in &design.regions {
            self.regions.insert_with(&region.name, |id| PhysicalRegion {
                id,
                name: region.name.clone(),
                region_type: RegionType::from_name(&region.region_type),
                bounds: region.rects.iter().map(|r| r.scale(multiplier)).collect(),
            });
        }
        for group in &design.groups {
            let region = group.region.as_deref().and_then(|name| {
                let id = self.regions.id_of(name);
                if id.is_none() {
                    log::warn!("Region {} of group {} was not defined.", name, group.name);
                }
                id
            });
            self.groups.insert_with(&group.name, |id| PhysicalGroup {
                id,
                name: group.name.clone(),
                patterns: group.patterns.clone(),
                region,
            });
        }

        for net in &design.nets {
            self.add_physical_net(net, multiplier);
        }
        for index in 0..self.netlist.num_nets() {
            let net = NetId::from_index(index);
            if !self.nets.contains(net) {
                self.nets.insert(net, PhysicalNet::default());
            }
        }

        self.counts[PhysicalType::Port.slot()] = self.netlist.num_ports();

        log::info!(
            "Design {} loaded: {} components, {} ports, {} rows, {} routed nets (multiplier {})",
            design.name,
            design.components.len(),
            design.ports.len(),
            self.rows.len(),
            design.nets.len(),
            multiplier
        );
        Ok(())
    }

    fn validate_design(&self, design: &DesignDescriptor) -> PhysicalResult<()> {
        for component in &design.components {
            let cell = self
                .netlist
                .find_cell(&component.name)
                .ok_or_else(|| PhysicalError::UndefinedCell(component.name.clone()))?;
            if let Some(lib) = self.netlist.instance(cell).library_cell() {
                if !self.library_cells.contains(lib) {
                    return Err(PhysicalError::UndefinedLibraryCell(
                        self.netlist.library_cell(lib).name.clone(),
                    ));
                }
            }
        }
        for port in &design.ports {
            if self.netlist.find_port(&port.name).is_none() {
                return Err(PhysicalError::UndefinedPort(port.name.clone()));
            }
        }
        for row in &design.rows {
            if !self.sites.contains(&row.site) {
                return Err(PhysicalError::UndefinedSite {
                    site: row.site.clone(),
                    row: row.name.clone(),
                });
            }
        }
        for net in &design.nets {
            if self.netlist.find_net(&net.name).is_none() {
                return Err(PhysicalError::UndefinedNet(net.name.clone()));
            }
            for segment in net.wires.iter().flat_map(|w| &w.segments) {
                if self.layers.layer_id(&segment.layer).is_none() {
                    return Err(PhysicalError::UndefinedLayer {
                        layer: segment.layer.clone(),
                        net: net.name.clone(),
                    });
                }
                if let Some(via) = &segment.via {
                    if !self.vias.contains(via) {
                        return Err(PhysicalError::UndefinedVia {
                            via: via.clone(),
                            net: net.name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn add_physical_cell(&mut self, component: &ComponentDescriptor, multiplier: Dbu) {
        let Some(cell) = self.netlist.find_cell(&component.name) else {
            return;
        };
        if self.instances.contains(cell) {
            log::warn!("Component {} was already placed. Skipping ...", component.name);
            return;
        }
        let Some(lib) = self
            .netlist
            .instance(cell)
            .library_cell()
            .and_then(|lib| self.library_cells.get(lib))
        else {
            return;
        };
        let size = lib.size;
        let block = lib.is_macro_block();
        let layer_bound_rects = lib.layer_obstacle().map(|obstacle| obstacle.bounds.len());

        let position = component.position.scale(multiplier);
        let mut instance = PhysicalInstance::new(
            PhysicalInstanceKind::Cell,
            Bounds::from_corners(position, position + size),
        );
        instance.fixed = component.fixed;
        instance.block = block;
        instance.placed = component.placed || component.fixed;
        instance.has_layer_bounds = layer_bound_rects.is_some();
        instance.orientation = parse_orientation(&component.orientation, &component.name);

        if instance.fixed {
            self.counts[PhysicalType::Fixed.slot()] += 1;
            self.counts[PhysicalType::FixedBounds.slot()] += layer_bound_rects.unwrap_or(1);
        } else {
            self.counts[PhysicalType::Movable.slot()] += 1;
        }
        if block {
            self.counts[PhysicalType::Block.slot()] += 1;
        }
        self.account_area(&instance, instance.area());
        self.instances.insert(cell, instance);

        if self.pins.is_some() {
            self.add_physical_pins(cell);
        }
    }

    fn add_physical_pins(&mut self, cell: InstanceId) {
        let records: Vec<_> = self
            .netlist
            .instance(cell)
            .pins
            .iter()
            .filter_map(|&pin| {
                let lib_pin = self.library_pins.get(self.netlist.pin(pin).library_pin?)?;
                Some((
                    pin,
                    PhysicalPin {
                        displacement: lib_pin.displacement(),
                        layer_bounds: lib_pin.layer_bound,
                        layer: lib_pin.layer(),
                    },
                ))
            })
            .collect();
        if let Some(pins) = self.pins.as_mut() {
            for (pin, record) in records {
                pins.insert(pin, record);
            }
        }
    }

    fn add_physical_port(&mut self, port: &IoPortDescriptor, multiplier: Dbu) {
        let Some(id) = self.netlist.find_port(&port.name) else {
            return;
        };
        if self.instances.contains(id) {
            log::warn!("Port {} was already placed. Skipping ...", port.name);
            return;
        }
        let position = port.position.scale(multiplier);
        let mut instance = PhysicalInstance::new(PhysicalInstanceKind::Port, Bounds::from_point(position));
        instance.fixed = true;
        instance.placed = true;
        instance.port_layer = self.resolve_layer(&port.layer, &port.name);
        self.instances.insert(id, instance);
    }

    /// Add a placement row and grow the top module and placeable area.
    ///
    /// The origin is given in design units. Fails if no design was loaded
    /// or the row names an undefined site.
    pub fn add_physical_row(&mut self, row: &RowDescriptor) -> PhysicalResult<RowId> {
        if !self.design_loaded {
            return Err(PhysicalError::DesignNotLoaded);
        }
        let site = self
            .sites
            .get_by_name(&row.site)
            .ok_or_else(|| PhysicalError::UndefinedSite {
                site: row.site.clone(),
                row: row.name.clone(),
            })?;
        let site_id = site.id;
        let step = site.size;

        let origin = row.origin.scale(self.units.multiplier());
        let num_sites = DbuXy::new(row.num_x, row.num_y);
        let extent = DbuXy::new(step.x * num_sites.x, step.y * num_sites.y);
        let bounds = Bounds::from_corners(origin, origin + extent);

        let top = self.netlist.top_module();
        if let Some(module) = self.instances.get_mut(top) {
            module.bounds = module.bounds.union(&bounds);
        }
        self.areas[PhysicalType::Placeable.slot()] += bounds.area();

        let id = RowId::from_index(self.rows.len());
        self.rows.push(PhysicalRow {
            id,
            name: row.name.clone(),
            site: site_id,
            origin,
            orientation: parse_orientation(&row.orientation, &row.name),
            step,
            num_sites,
            bounds,
        });
        Ok(id)
    }

    fn add_physical_net(&mut self, descriptor: &NetDescriptor, multiplier: Dbu) {
        let Some(net) = self.netlist.find_net(&descriptor.name) else {
            return;
        };
        if self.nets.contains(net) {
            log::warn!("Net {} was already defined. Skipping ...", descriptor.name);
            return;
        }

        let mut record = PhysicalNet::default();
        for wire in &descriptor.wires {
            let mut segments = Vec::with_capacity(wire.segments.len());
            for segment in &wire.segments {
                let layer = self.layers.layer_id(&segment.layer);
                let half_width = layer
                    .and_then(|id| self.layers.get_layer(id))
                    .map_or(0, |l| l.width / 2);
                let via = segment.via.as_deref().and_then(|name| self.vias.id_of(name));

                let mut points: Vec<DbuXy> =
                    segment.points.iter().map(|p| p.scale(multiplier)).collect();
                if let (Some(via), Some(&position)) = (via, points.last()) {
                    record.vias.push(PhysicalViaInstance { via, position });
                }
                let begin = segment.extension_begin.map_or(half_width, |e| e * multiplier);
                let end = segment.extension_end.map_or(half_width, |e| e * multiplier);
                extend_path(&mut points, begin, end);

                segments.push(PhysicalWireSegment {
                    points,
                    layer,
                    via,
                    rectangle: segment.rect.map(|r| r.scale(multiplier)),
                });
            }
            record.wires.push(PhysicalWire { segments });
        }
        self.nets.insert(net, record);
    }
}

fn parse_orientation(name: &str, owner: &str) -> Orientation {
    if name.is_empty() {
        return Orientation::N;
    }
    Orientation::from_name(name).unwrap_or_else(|| {
        log::warn!("Unknown orientation {} on {}. Using N.", name, owner);
        Orientation::N
    })
}
