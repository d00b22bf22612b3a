//! Frame Solver Example - 3D Portal Frame

use frame_solver::prelude::*;

fn print_displacements(model: &Model, labels: &[(&str, NodeSlot)]) {
    println!("Node Displacements:");
    for (label, slot) in labels {
        let disp = model.node_displacement(*slot);
        println!(
            "  {}: DX={:.4}mm, DY={:.4}mm, DZ={:.4}mm, RY={:.6}rad",
            label,
            disp.dx * 1000.0,
            disp.dy * 1000.0,
            disp.dz * 1000.0,
            disp.ry
        );
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("=== Frame Solver Example: 3D Portal Frame ===\n");

    let mut model = Model::new();

    // W12x26 (approximate properties)
    // A = 0.00494 m², Izz = 8.49e-5 m⁴, Iyy = 7.2e-6 m⁴, J = 1.25e-7 m⁴
    let steel = Material::steel();
    let w12 = model.add_section(
        SectionProperties::new(0.00494, steel.e, steel.g, 8.49e-5)
            .with_iyy(7.2e-6)
            .with_torsion(1.25e-7),
    )?;

    // Four columns on a square plan, tied at roof level
    //
    //        N7 ---------- N8
    //       /|            /|
    //     N5 ---------- N6 |
    //     |  N3         |  N4
    //     | /           | /
    //     N1           N2
    //     ^             ^
    //   Fixed        Fixed
    //
    let height = 4.0;
    let span = 6.0;

    let n1 = model.add_node(0.0, 0.0, 0.0);
    let n2 = model.add_node(span, 0.0, 0.0);
    let n3 = model.add_node(0.0, 0.0, span);
    let n4 = model.add_node(span, 0.0, span);
    let n5 = model.add_node(0.0, height, 0.0);
    let n6 = model.add_node(span, height, 0.0);
    let n7 = model.add_node(0.0, height, span);
    let n8 = model.add_node(span, height, span);

    // Orientation references: one off to the side of the columns, one above
    // the roof for the beams
    let side = model.add_node(-1.0, 0.0, -1.0);
    let sky = model.add_node(span / 2.0, 2.0 * height, span / 2.0);

    for (base, top) in [(n1, n5), (n2, n6), (n3, n7), (n4, n8)] {
        model.add_element(base, top, side, w12)?;
    }
    for (a, b) in [(n5, n6), (n6, n8), (n8, n7), (n7, n5)] {
        model.add_element(a, b, sky, w12)?;
    }

    for base in [n1, n2, n3, n4] {
        model.add_support(base)?;
    }

    // Gravity: 20 kN/m tributary on the roof beams, lumped at the corners
    let corner_load = -span * 20000.0 / 2.0;
    for top in [n5, n6, n7, n8] {
        model.add_force(top, LoadComponent::Fy, corner_load)?;
    }

    let labels = [("N5", n5), ("N6", n6), ("N7", n7), ("N8", n8)];

    println!("Running gravity analysis...\n");
    let summary = model.solve()?;
    print_displacements(&model, &labels);
    println!("\nSummary:");
    println!("  Solver: {:?}", summary.method);
    println!("  Equations: {} of {}", summary.reduced_dofs, summary.total_dofs);
    println!("  Max displacement: {:.4}mm", summary.max_displacement * 1000.0);

    // Add 10 kN wind at roof level and re-solve
    println!("\n=== Adding lateral load ===\n");
    model.add_force(n5, LoadComponent::Fx, 10000.0)?;
    model.add_force(n7, LoadComponent::Fx, 10000.0)?;
    assert!(!model.is_solved());

    let summary = model.solve()?;
    print_displacements(&model, &labels);
    if let Some(node) = summary.max_disp_node {
        println!(
            "\n  Max displacement: {:.4}mm at node slot {}",
            summary.max_displacement * 1000.0,
            node
        );
    }

    println!("\n=== Analysis Complete ===");
    Ok(())
}
