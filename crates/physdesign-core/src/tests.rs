//! End-to-end tests over a small two-row design with one macro block.

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::PhysicalConfig;
use crate::descriptor::*;
use crate::design::{PhysicalDesign, PhysicalType};
use crate::error::PhysicalError;
use crate::geometry::{Boundary, Bounds, Dbu, DbuXy, Dimension};
use crate::ids::{InstanceId, NetId, PinId};
use crate::library::PinDirection;
use crate::netlist::Netlist;
use crate::session::Session;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn netlist() -> Netlist {
    let mut netlist = Netlist::new("top");
    let inv = netlist
        .add_library_cell("INV", &[("A", PinDirection::Input), ("Y", PinDirection::Output)])
        .unwrap();
    let ram = netlist
        .add_library_cell("RAM", &[("D", PinDirection::Input), ("Q", PinDirection::Output)])
        .unwrap();
    for name in ["u1", "u2", "u3"] {
        netlist.add_cell(name, inv).unwrap();
    }
    netlist.add_cell("ram", ram).unwrap();
    netlist.add_port("clk", PinDirection::Input).unwrap();
    netlist.add_port("out", PinDirection::Output).unwrap();

    let wiring: [(&str, &[(&str, &str)]); 4] = [
        ("n1", &[("u1", "Y"), ("u2", "A")]),
        ("clk", &[("clk", "clk"), ("u1", "A"), ("ram", "D")]),
        ("nout", &[("u2", "Y"), ("out", "out")]),
        ("n2", &[("ram", "Q"), ("u3", "A")]),
    ];
    for (net_name, pins) in wiring {
        let net = netlist.add_net(net_name).unwrap();
        for (inst, pin) in pins {
            let inst = netlist.find_instance(inst).unwrap();
            let pin = netlist.find_pin(inst, pin).unwrap();
            netlist.connect(net, pin).unwrap();
        }
    }
    netlist
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> DoubleRect {
    DoubleRect::new(x0, y0, x1, y1)
}

fn pin(name: &str, r: DoubleRect) -> PinDescriptor {
    PinDescriptor {
        name: name.to_string(),
        direction: String::new(),
        ports: vec![PortDescriptor {
            layer: "metal1".to_string(),
            rects: vec![r],
            polygons: Vec::new(),
        }],
    }
}

fn library() -> LibraryDescriptor {
    let layer = |name: &str, ty: &str, width: f64| LayerDescriptor {
        name: name.to_string(),
        layer_type: ty.to_string(),
        direction: "HORIZONTAL".to_string(),
        pitch: 0.2,
        spacing: 0.1,
        width,
    };
    LibraryDescriptor {
        database_units: Some(2000),
        sites: vec![SiteDescriptor {
            name: "core".to_string(),
            class: "CORE".to_string(),
            size: [0.2, 2.0],
        }],
        layers: vec![
            layer("metal1", "ROUTING", 0.1),
            layer("via1", "CUT", 0.1),
            layer("metal2", "ROUTING", 0.14),
        ],
        vias: vec![ViaDescriptor {
            name: "via12".to_string(),
            layers: vec![
                ViaLayerDescriptor {
                    layer: "metal1".to_string(),
                    rects: vec![rect(-0.05, -0.05, 0.05, 0.05)],
                },
                ViaLayerDescriptor {
                    layer: "via1".to_string(),
                    rects: vec![rect(-0.03, -0.03, 0.03, 0.03)],
                },
            ],
        }],
        spacings: vec![SpacingDescriptor {
            layer1: "metal1".to_string(),
            layer2: "metal2".to_string(),
            distance: 0.07,
        }],
        macros: vec![
            MacroDescriptor {
                name: "INV".to_string(),
                class: "CORE".to_string(),
                size: [0.4, 2.0],
                pins: vec![
                    pin("A", rect(0.05, 0.5, 0.15, 1.5)),
                    pin("Y", rect(0.25, 0.5, 0.35, 1.5)),
                ],
                obstacles: Vec::new(),
            },
            MacroDescriptor {
                name: "RAM".to_string(),
                class: "BLOCK".to_string(),
                size: [10.0, 10.0],
                pins: vec![
                    pin("D", rect(0.0, 0.0, 0.2, 0.2)),
                    pin("Q", rect(9.8, 9.8, 10.0, 10.0)),
                ],
                obstacles: vec![
                    ObstacleDescriptor {
                        layer: "metal2".to_string(),
                        rects: vec![rect(1.0, 1.0, 2.0, 2.0)],
                    },
                    ObstacleDescriptor {
                        layer: "metal1".to_string(),
                        rects: vec![rect(0.0, 0.0, 10.0, 5.0), rect(0.0, 5.0, 10.0, 10.0)],
                    },
                ],
            },
        ],
    }
}

fn component(name: &str, x: Dbu, y: Dbu, fixed: bool) -> ComponentDescriptor {
    ComponentDescriptor {
        name: name.to_string(),
        position: DbuXy::new(x, y),
        orientation: "N".to_string(),
        fixed,
        placed: !fixed,
    }
}

fn row(name: &str, y: Dbu) -> RowDescriptor {
    RowDescriptor {
        name: name.to_string(),
        site: "core".to_string(),
        origin: DbuXy::new(0, y),
        orientation: "N".to_string(),
        num_x: 50,
        num_y: 1,
    }
}

fn design_descriptor() -> DesignDescriptor {
    DesignDescriptor {
        name: "top".to_string(),
        database_units: 1000,
        die: Bounds::new(0, 0, 20000, 20000),
        components: vec![
            component("u1", 0, 0, false),
            component("u2", 1000, 0, false),
            component("u3", 2000, 0, false),
            component("ram", 5000, 5000, true),
        ],
        ports: vec![
            IoPortDescriptor {
                name: "clk".to_string(),
                position: DbuXy::new(0, 10000),
                layer: "metal2".to_string(),
            },
            IoPortDescriptor {
                name: "out".to_string(),
                position: DbuXy::new(20000, 10000),
                layer: "metal2".to_string(),
            },
        ],
        rows: vec![row("row0", 0), row("row1", 2000)],
        regions: vec![RegionDescriptor {
            name: "fence0".to_string(),
            region_type: "FENCE".to_string(),
            rects: vec![Bounds::new(0, 0, 1000, 1000)],
        }],
        groups: vec![GroupDescriptor {
            name: "g0".to_string(),
            patterns: vec!["u*".to_string()],
            region: Some("fence0".to_string()),
        }],
        nets: vec![NetDescriptor {
            name: "n1".to_string(),
            wires: vec![WireDescriptor {
                segments: vec![WireSegmentDescriptor {
                    layer: "metal1".to_string(),
                    points: vec![DbuXy::new(300, 1000), DbuXy::new(1300, 1000)],
                    via: Some("via12".to_string()),
                    rect: None,
                    extension_begin: None,
                    extension_end: None,
                }],
            }],
        }],
    }
}

fn loaded(config: PhysicalConfig) -> PhysicalDesign {
    init_logger();
    let mut design = PhysicalDesign::new(netlist(), config);
    design.load_library(&library()).unwrap();
    design.load_design(&design_descriptor()).unwrap();
    design
}

fn cell(design: &PhysicalDesign, name: &str) -> InstanceId {
    design.netlist().find_instance(name).unwrap()
}

fn net(design: &PhysicalDesign, name: &str) -> NetId {
    design.netlist().find_net(name).unwrap()
}

fn pin_of(design: &PhysicalDesign, inst: &str, name: &str) -> PinId {
    design.netlist().find_pin(cell(design, inst), name).unwrap()
}

fn net_sum(design: &PhysicalDesign) -> DbuXy {
    design
        .nets()
        .fold(DbuXy::default(), |acc, (_, net)| acc + net.hpwl())
}

// ── Ingestion ────────────────────────────────────────────────────────

#[test]
fn test_library_scaled_to_library_units() {
    let design = loaded(PhysicalConfig::default());
    assert_eq!(design.units().library(), 2000);
    assert_eq!(design.units().design(), 1000);
    assert_eq!(design.units().multiplier(), 2);

    let site = design.site_by_name("core").unwrap();
    assert_eq!(site.size, DbuXy::new(400, 4000));
    let metal1 = design.layers().get_layer_by_name("metal1").unwrap();
    assert_eq!(metal1.width, 200);
    assert_eq!(metal1.relative_index, 0);
    assert_eq!(design.layers().get_layer_by_name("metal2").unwrap().relative_index, 1);
    assert_eq!(design.spacings()[0].distance, 140);
    assert_eq!(design.via_by_name("via12").unwrap().layers.len(), 2);

    let inv = design.netlist().find_library_cell("INV").unwrap();
    assert_eq!(design.library_cell(inv).unwrap().size, DbuXy::new(800, 4000));
}

#[test]
fn test_design_coordinates_use_multiplier() {
    let design = loaded(PhysicalConfig::default());
    let u2 = design.instance(cell(&design, "u2")).unwrap();
    assert_eq!(u2.bounds, Bounds::new(2000, 0, 2800, 4000));
    assert!(u2.placed);
    let ram = design.instance(cell(&design, "ram")).unwrap();
    assert!(ram.fixed && ram.block && ram.has_layer_bounds);
    assert_eq!(ram.position(), DbuXy::new(10000, 10000));
    let clk = design.instance(cell(&design, "clk")).unwrap();
    assert_eq!(clk.bounds, Bounds::from_point(DbuXy::new(0, 20000)));
    assert!(clk.port_layer.is_some());
    assert_eq!(design.die().bounds, Bounds::new(0, 0, 40000, 40000));
}

#[test]
fn test_rows_extend_module_and_placeable_area() {
    let design = loaded(PhysicalConfig::default());
    assert_eq!(design.num_rows(), 2);
    assert_eq!(design.row_height(), Some(4000));
    assert_eq!(design.row_site_width(), Some(400));
    assert_eq!(design.rows()[1].bounds, Bounds::new(0, 4000, 20000, 8000));
    assert_eq!(design.area(PhysicalType::Placeable), 2 * 20000 * 4000);
    let top = design.netlist().top_module();
    assert_eq!(design.instance(top).unwrap().bounds, Bounds::new(0, 0, 20000, 8000));
}

#[test]
fn test_add_row_before_load_fails() {
    init_logger();
    let mut design = PhysicalDesign::new(netlist(), PhysicalConfig::default());
    design.load_library(&library()).unwrap();
    assert!(matches!(
        design.add_physical_row(&row("early", 0)),
        Err(PhysicalError::DesignNotLoaded)
    ));
    assert_eq!(design.num_rows(), 0);
    assert_eq!(design.area(PhysicalType::Placeable), 0);
}

#[test]
fn test_row_added_after_load_grows_module() {
    let mut design = loaded(PhysicalConfig::default());
    let id = design.add_physical_row(&row("row2", 4000)).unwrap();
    assert_eq!(design.num_rows(), 3);
    let added = design.row(id).unwrap();
    assert_eq!(added.origin, DbuXy::new(0, 8000));
    assert_eq!(added.bounds, Bounds::new(0, 8000, 20000, 12000));
    assert_eq!(design.area(PhysicalType::Placeable), 3 * 20000 * 4000);
    let top = design.netlist().top_module();
    assert_eq!(design.instance(top).unwrap().bounds, Bounds::new(0, 0, 20000, 12000));

    let mut stray = row("row3", 6000);
    stray.site = "nope".to_string();
    assert!(matches!(
        design.add_physical_row(&stray),
        Err(PhysicalError::UndefinedSite { site, .. }) if site == "nope"
    ));
    assert_eq!(design.num_rows(), 3);
    assert_eq!(design.area(PhysicalType::Placeable), 3 * 20000 * 4000);
}

#[test]
fn test_area_and_count_aggregates() {
    let design = loaded(PhysicalConfig::default());
    assert_eq!(design.area(PhysicalType::Movable), 3 * 800 * 4000);
    assert_eq!(design.area(PhysicalType::Fixed), 20000 * 20000);
    assert_eq!(design.area(PhysicalType::Block), 20000 * 20000);
    assert_eq!(design.area(PhysicalType::Port), 0);
    assert_eq!(design.num_elements(PhysicalType::Movable), 3);
    assert_eq!(design.num_elements(PhysicalType::Fixed), 1);
    assert_eq!(design.num_elements(PhysicalType::Block), 1);
    assert_eq!(design.num_elements(PhysicalType::Port), 2);
    // two unmerged rectangles on the lowest routing layer
    assert_eq!(design.num_elements(PhysicalType::FixedBounds), 2);
}

#[test]
fn test_merge_flag_merges_obstacles() {
    let design = loaded(PhysicalConfig {
        enable_merge_rectangles: true,
        ..PhysicalConfig::default()
    });
    let ram = design.netlist().find_library_cell("RAM").unwrap();
    let lib = design.library_cell(ram).unwrap();
    assert_eq!(lib.layer_bound_index, Some(1));
    assert_eq!(
        lib.layer_obstacle().unwrap().bounds,
        vec![Bounds::new(0, 0, 20000, 20000)]
    );
    assert_eq!(design.num_elements(PhysicalType::FixedBounds), 1);
}

#[test]
fn test_routed_wire_is_extended_with_via() {
    let design = loaded(PhysicalConfig::default());
    let n1 = design.net(net(&design, "n1")).unwrap();
    assert_eq!(n1.num_wires(), 1);
    let segment = &n1.wires[0].segments[0];
    assert_eq!(segment.points, vec![DbuXy::new(500, 2000), DbuXy::new(2700, 2000)]);
    assert_eq!(n1.vias.len(), 1);
    assert_eq!(n1.vias[0].position, DbuXy::new(2600, 2000));
    // unrouted nets still get a record
    assert_eq!(design.net(net(&design, "n2")).unwrap().num_wires(), 0);
}

#[test]
fn test_regions_and_groups() {
    let design = loaded(PhysicalConfig::default());
    let fence = design.region_by_name("fence0").unwrap();
    assert_eq!(fence.bounds, vec![Bounds::new(0, 0, 2000, 2000)]);
    let group = design.group_by_name("g0").unwrap();
    assert_eq!(group.region, Some(fence.id));
}

#[test]
fn test_incompatible_resolution_leaves_design_unloaded() {
    init_logger();
    let mut design = PhysicalDesign::new(netlist(), PhysicalConfig::default());
    design.load_library(&library()).unwrap();
    let sites = design.num_sites();
    let layers = design.layers().layer_count();
    let vias = design.num_vias();
    let mut descriptor = design_descriptor();
    descriptor.database_units = 300;
    assert!(matches!(
        design.load_design(&descriptor),
        Err(PhysicalError::IncompatibleResolution { library: 2000, design: 300 })
    ));
    assert!(!design.is_design_loaded());
    assert_eq!(design.units().multiplier(), 0);
    assert_eq!(design.units().library(), 2000);
    assert_eq!(design.num_sites(), sites);
    assert_eq!(design.layers().layer_count(), layers);
    assert_eq!(design.num_vias(), vias);
    assert_eq!(design.num_rows(), 0);
    assert!(design.instance(cell(&design, "u1")).is_none());

    descriptor.database_units = 1000;
    design.load_design(&descriptor).unwrap();
    assert_eq!(design.units().multiplier(), 2);
}

#[test]
fn test_second_library_with_other_resolution_is_skipped() {
    let mut design = loaded(PhysicalConfig::default());
    let mut other = LibraryDescriptor {
        database_units: Some(1000),
        ..LibraryDescriptor::default()
    };
    other.sites.push(SiteDescriptor {
        name: "io".to_string(),
        class: "PAD".to_string(),
        size: [1.0, 1.0],
    });
    design.load_library(&other).unwrap();
    assert!(design.site_by_name("io").is_none());
    assert_eq!(design.units().library(), 2000);
}

#[test]
fn test_duplicate_names_keep_first_definition() {
    init_logger();
    let mut lib = library();
    lib.sites.push(SiteDescriptor {
        name: "core".to_string(),
        class: "CORE".to_string(),
        size: [9.0, 9.0],
    });
    let mut design = PhysicalDesign::new(netlist(), PhysicalConfig::default());
    design.load_library(&lib).unwrap();
    assert_eq!(design.num_sites(), 1);
    assert_eq!(design.site_by_name("core").unwrap().size, DbuXy::new(400, 4000));
}

#[test]
fn test_undefined_macro_is_fatal_before_mutation() {
    init_logger();
    let mut lib = library();
    lib.macros.push(MacroDescriptor {
        name: "NAND2".to_string(),
        ..MacroDescriptor::default()
    });
    let mut design = PhysicalDesign::new(netlist(), PhysicalConfig::default());
    assert!(matches!(
        design.load_library(&lib),
        Err(PhysicalError::UndefinedLibraryCell(name)) if name == "NAND2"
    ));
    assert_eq!(design.num_sites(), 0);
    assert_eq!(design.layers().layer_count(), 0);
}

#[test]
fn test_rejected_library_records_no_resolution() {
    init_logger();
    let mut bad = library();
    bad.database_units = Some(1000);
    bad.macros.push(MacroDescriptor {
        name: "NAND2".to_string(),
        ..MacroDescriptor::default()
    });
    let mut design = PhysicalDesign::new(netlist(), PhysicalConfig::default());
    assert!(design.load_library(&bad).is_err());
    assert_eq!(design.units().library(), 0);

    design.load_library(&library()).unwrap();
    assert_eq!(design.units().library(), 2000);
    assert_eq!(design.num_sites(), 1);
    assert_eq!(design.site_by_name("core").unwrap().size, DbuXy::new(400, 4000));
}

#[test]
fn test_undefined_cell_is_fatal() {
    init_logger();
    let mut design = PhysicalDesign::new(netlist(), PhysicalConfig::default());
    design.load_library(&library()).unwrap();
    let mut descriptor = design_descriptor();
    descriptor.components.push(component("ghost", 0, 0, false));
    assert!(matches!(
        design.load_design(&descriptor),
        Err(PhysicalError::UndefinedCell(name)) if name == "ghost"
    ));
    assert!(!design.is_design_loaded());
    assert!(design.instance(cell(&design, "u1")).is_none());
}

#[test]
fn test_undefined_site_is_fatal() {
    init_logger();
    let mut design = PhysicalDesign::new(netlist(), PhysicalConfig::default());
    design.load_library(&library()).unwrap();
    let mut descriptor = design_descriptor();
    descriptor.rows[1].site = "nope".to_string();
    assert!(matches!(
        design.load_design(&descriptor),
        Err(PhysicalError::UndefinedSite { site, .. }) if site == "nope"
    ));
    assert_eq!(design.num_rows(), 0);
}

#[test]
fn test_design_loads_once() {
    let mut design = loaded(PhysicalConfig::default());
    let mut again = design_descriptor();
    again.rows.push(row("row2", 4000));
    design.load_design(&again).unwrap();
    assert_eq!(design.num_rows(), 2);
}

#[test]
fn test_session_gates_ingestion() {
    init_logger();
    let mut session = Session::new();
    assert!(matches!(
        session.load_library(&library()),
        Err(PhysicalError::NotInitialized)
    ));
    session.init_physical_design(netlist(), PhysicalConfig::default());
    session.load_library(&library()).unwrap();
    session.load_design(&design_descriptor()).unwrap();
    assert!(session.physical().unwrap().is_design_loaded());
}

// ── Pins and wirelength ──────────────────────────────────────────────

#[test]
fn test_pin_positions() {
    let design = loaded(PhysicalConfig::default());
    let a = pin_of(&design, "u2", "A");
    assert_eq!(design.pin_displacement(a), DbuXy::new(200, 2000));
    assert_eq!(design.pin_position(a), Some(DbuXy::new(2200, 2000)));
    assert_eq!(design.relaxed_pin_position(a), Some(DbuXy::new(2000, 0)));

    let d = pin_of(&design, "ram", "D");
    assert_eq!(design.relaxed_pin_position(d), design.pin_position(d));

    let clk = pin_of(&design, "clk", "clk");
    assert_eq!(design.pin_displacement(clk), DbuXy::default());
    assert_eq!(design.pin_position(clk), Some(DbuXy::new(0, 20000)));
    assert!(design.physical_pin(a).is_none());
}

#[test]
fn test_physical_pin_records() {
    let design = loaded(PhysicalConfig {
        enable_physical_pins: true,
        ..PhysicalConfig::default()
    });
    let y = pin_of(&design, "u1", "Y");
    let record = design.physical_pin(y).unwrap();
    assert_eq!(record.displacement, DbuXy::new(600, 2000));
    assert_eq!(record.layer_bounds, Bounds::new(500, 1000, 700, 3000));
    assert_eq!(record.layer, design.layers().layer_id("metal1"));
}

#[test]
fn test_total_hpwl() {
    let mut design = loaded(PhysicalConfig::default());
    design.update_all_net_bounds(false);
    assert_eq!(design.net(net(&design, "n1")).unwrap().hpwl(), DbuXy::new(1600, 0));
    assert_eq!(design.net(net(&design, "clk")).unwrap().hpwl(), DbuXy::new(10200, 18000));
    assert_eq!(design.hpwl(), DbuXy::new(74800, 63800));
    assert_eq!(design.total_hpwl(), 74800 + 63800);
    assert_eq!(design.hpwl(), net_sum(&design));
}

#[test]
fn test_update_net_bound_twice_changes_nothing() {
    let mut design = loaded(PhysicalConfig::default());
    design.update_all_net_bounds(false);
    let before = design.hpwl();
    let n2 = net(&design, "n2");
    design.update_net_bound(n2);
    design.update_net_bound(n2);
    assert_eq!(design.hpwl(), before);
}

#[test]
fn test_unknown_ids_are_ignored() {
    let mut design = loaded(PhysicalConfig::default());
    design.update_all_net_bounds(false);
    let before = design.hpwl();

    design.update_net_bound(NetId::from_raw(700));
    assert_eq!(design.hpwl(), before);

    design.mark_instance_dirty(InstanceId::from_raw(700));
    assert_eq!(design.num_dirty_nets(), 0);

    let ghost = PinId::from_raw(700);
    assert_eq!(design.pin_position(ghost), None);
    assert_eq!(design.relaxed_pin_position(ghost), None);
    assert_eq!(design.pin_displacement(ghost), DbuXy::default());
    assert!(matches!(
        design.place_cell(InstanceId::from_raw(700), 0, 0, false),
        Err(PhysicalError::NoPhysicalInstance(_))
    ));
}

#[test]
fn test_boundary_pins_prefer_last_on_ties() {
    let mut design = loaded(PhysicalConfig {
        enable_net_pin_boundaries: true,
        ..PhysicalConfig::default()
    });
    let n1 = net(&design, "n1");
    design.update_net_bound(n1);
    let y = pin_of(&design, "u1", "Y");
    let a = pin_of(&design, "u2", "A");
    let record = design.net(n1).unwrap();
    assert_eq!(record.bound_pin(Boundary::Lower, Dimension::X), Some(y));
    assert_eq!(record.bound_pin(Boundary::Upper, Dimension::X), Some(a));
    // both pins share y = 2000
    assert_eq!(record.bound_pin(Boundary::Lower, Dimension::Y), Some(a));
    assert_eq!(record.bound_pin(Boundary::Upper, Dimension::Y), Some(a));
}

#[test]
fn test_boundary_pins_untracked_by_default() {
    let mut design = loaded(PhysicalConfig::default());
    let n1 = net(&design, "n1");
    design.update_net_bound(n1);
    let record = design.net(n1).unwrap();
    assert_eq!(record.bound_pin(Boundary::Upper, Dimension::X), None);
}

#[test]
fn test_skipping_clock_excludes_its_wirelength() {
    let mut design = loaded(PhysicalConfig::default());
    let clk = net(&design, "clk");
    design.set_clock_net(Some(clk));
    design.update_all_net_bounds(false);
    let with_clock = design.hpwl();
    design.update_all_net_bounds(true);
    assert_eq!(design.hpwl(), with_clock - DbuXy::new(10200, 18000));
}

#[test]
fn test_incremental_updates_match_full_recompute() {
    let mut design = loaded(PhysicalConfig::default());
    design.update_all_net_bounds(false);
    let cells: Vec<InstanceId> = ["u1", "u2", "u3"].iter().map(|n| cell(&design, n)).collect();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let moved = cells[rng.gen_range(0..cells.len())];
        let x = rng.gen_range(0..19000);
        let y = rng.gen_range(0..2) * 4000;
        design.place_cell(moved, x, y, true).unwrap();
        design.mark_instance_dirty(moved);
        design.update_dirty_net_bounds();
        assert_eq!(design.hpwl(), net_sum(&design));
    }
    let incremental = design.hpwl();
    design.update_all_net_bounds(false);
    assert_eq!(design.hpwl(), incremental);
}

// ── Placement and observers ──────────────────────────────────────────

fn record_moves(design: &mut PhysicalDesign, priorities: &[i32]) -> Rc<RefCell<Vec<i32>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    for &priority in priorities {
        let log = Rc::clone(&log);
        design.add_post_instance_moved_callback(priority, move |_, _| {
            log.borrow_mut().push(priority)
        });
    }
    log
}

#[test]
fn test_observers_run_in_priority_order() {
    let mut design = loaded(PhysicalConfig::default());
    let log = record_moves(&mut design, &[5, 1, 3]);
    let u1 = cell(&design, "u1");
    assert!(design.place_cell(u1, 400, 0, false).unwrap());
    assert_eq!(*log.borrow(), vec![1, 3, 5]);
}

#[test]
fn test_observers_see_new_position() {
    let mut design = loaded(PhysicalConfig::default());
    let seen = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    design.add_post_instance_moved_callback(0, move |id, inst| {
        *sink.borrow_mut() = Some((id, inst.position()));
    });
    let u3 = cell(&design, "u3");
    design.place_cell(u3, 6000, 4000, false).unwrap();
    assert_eq!(*seen.borrow(), Some((u3, DbuXy::new(6000, 4000))));
}

#[test]
fn test_suppressed_move_then_manual_notify() {
    let mut design = loaded(PhysicalConfig::default());
    design.update_all_net_bounds(false);
    let log = record_moves(&mut design, &[0]);
    let u2 = cell(&design, "u2");
    let n1 = net(&design, "n1");
    let before = design.net(n1).unwrap().hpwl();

    assert!(design.place_cell(u2, 8000, 0, true).unwrap());
    assert!(log.borrow().is_empty());
    assert_eq!(design.net(n1).unwrap().hpwl(), before);

    design.notify_observers(u2).unwrap();
    assert_eq!(*log.borrow(), vec![0]);
    design.update_net_bound(n1);
    assert_eq!(design.net(n1).unwrap().hpwl(), DbuXy::new(7600, 0));
}

#[test]
fn test_no_move_no_notification() {
    let mut design = loaded(PhysicalConfig::default());
    let log = record_moves(&mut design, &[0]);
    let u1 = cell(&design, "u1");
    assert!(!design.place_cell(u1, 0, 0, false).unwrap());
    assert!(log.borrow().is_empty());
}

#[test]
fn test_notify_except_and_remove() {
    let mut design = loaded(PhysicalConfig::default());
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut handles = Vec::new();
    for tag in [1, 2] {
        let log = Rc::clone(&log);
        handles.push(design.add_post_instance_moved_callback(tag, move |_, _| {
            log.borrow_mut().push(tag)
        }));
    }
    let u1 = cell(&design, "u1");
    design.notify_observers_except(u1, handles[0]).unwrap();
    assert_eq!(*log.borrow(), vec![2]);
    assert!(design.remove_post_instance_moved_callback(handles[1]));
    design.notify_observers(u1).unwrap();
    assert_eq!(*log.borrow(), vec![2, 1]);
    assert_eq!(design.num_observers(), 1);
}

#[test]
fn test_ports_cannot_be_placed() {
    let mut design = loaded(PhysicalConfig::default());
    let clk = cell(&design, "clk");
    assert!(matches!(
        design.place_cell(clk, 1, 1, false),
        Err(PhysicalError::NotACell(_))
    ));
}

#[test]
fn test_moved_cells_and_macro_overlap() {
    let mut design = loaded(PhysicalConfig::default());
    assert_eq!(design.num_moved_cells(), 0);
    assert!(design.cells_overlapping_macros().is_empty());

    let u3 = cell(&design, "u3");
    design.place_cell(u3, 12000, 12000, false).unwrap();
    let ram = cell(&design, "ram");
    design.place_cell(ram, 10000, 10002, true).unwrap();
    // fixed macros are not counted as moved cells
    assert_eq!(design.num_moved_cells(), 1);
    assert_eq!(design.cells_overlapping_macros(), vec![u3]);

    // abutting the macro edge is not an overlap
    design.place_cell(u3, 30000, 12000, false).unwrap();
    assert!(design.cells_overlapping_macros().is_empty());
}

#[test]
fn test_summary_reports_aggregates() {
    let mut design = loaded(PhysicalConfig::default());
    design.update_all_net_bounds(false);
    let summary = design.summary();
    assert_eq!(summary.session, design.id());
    assert_eq!(summary.multiplier, 2);
    assert_eq!(summary.num_rows, 2);
    assert_eq!(summary.total_hpwl, 74800 + 63800);
    assert_eq!(summary.num_ports, 2);
    let json = summary.to_json().unwrap();
    let back: crate::design::DesignSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back, summary);
}
