use rand::Rng;
use ruggrid::{
    blit, compute_fov, find_path, magicnum, util::Color, AStarSettings, BitGrid, BlendMode,
    BspSettings, BspTree, Cell, Console, CostGrid, FovAlgorithm, FovSettings, FovShape, Grid,
    Neighborhood, Pathfinder, Rect,
};

fn random_opacity(width: i32, height: i32, seed: u64, density: f64) -> BitGrid {
    let mut rng = magicnum::seeded_rng(seed, 0x5eed);
    let mut grid = BitGrid::new(width, height).unwrap();

    for y in 0..height {
        for x in 0..width {
            if rng.gen_bool(density) {
                grid.set_bit(x, y, true).unwrap();
            }
        }
    }

    grid
}

fn random_costs(width: i32, height: i32, seed: u64) -> CostGrid {
    let mut rng = magicnum::seeded_rng(seed, 0xc057);

    Grid::from_fn(width, height, |_, _| {
        if rng.gen_bool(0.25) {
            0
        } else {
            rng.gen_range(1..4)
        }
    })
    .unwrap()
}

fn random_console(width: i32, height: i32, seed: u64) -> Console {
    let mut rng = magicnum::seeded_rng(seed, 0xc0de);
    let mut con = Console::new(width, height, Cell::default()).unwrap();

    for y in 0..height {
        for x in 0..width {
            let glyph = rng.gen_range(b'a'..=b'z') as char;
            let fg = Color::new(rng.gen(), rng.gen(), rng.gen());
            let bg = Color::new(rng.gen(), rng.gen(), rng.gen());
            con.set(x, y, glyph, fg, bg).unwrap();
        }
    }

    con
}

#[test]
fn full_replace_blit_copies_and_zero_alpha_does_nothing() {
    let source = random_console(6, 4, 1);
    let original = random_console(6, 4, 2);

    let mut dest = original.clone();
    blit(&source, Rect::new(0, 0, 6, 4), &mut dest, 0, 0, 1., 1., BlendMode::Replace).unwrap();
    assert_eq!(dest.cells(), source.cells());

    let mut dest = original.clone();
    blit(&source, Rect::new(0, 0, 6, 4), &mut dest, 0, 0, 1., 1., BlendMode::Alpha).unwrap();
    assert_eq!(dest.cells(), source.cells());

    for mode in [BlendMode::Replace, BlendMode::Add, BlendMode::Alpha, BlendMode::Default] {
        let mut dest = original.clone();
        blit(&source, Rect::new(0, 0, 6, 4), &mut dest, 0, 0, 0., 0., mode).unwrap();
        assert_eq!(dest, original, "{:?}", mode);
    }
}

#[test]
fn fov_origin_is_always_visible() {
    for seed in 0..5 {
        let opacity = random_opacity(15, 11, seed, 0.5);

        for algorithm in [
            FovAlgorithm::Shadow,
            FovAlgorithm::Symmetric,
            FovAlgorithm::Permissive,
        ] {
            let settings = FovSettings {
                radius: 4,
                light_walls: false,
                algorithm,
                shape: FovShape::Circle,
            };

            for (x, y) in Rect::new(0, 0, 15, 11).iter_positions() {
                let visible = compute_fov(&opacity, (x, y), &settings).unwrap();
                assert!(visible.get_bit(x, y));
            }
        }
    }
}

#[test]
fn fov_grows_with_radius() {
    let opacity = random_opacity(25, 25, 9, 0.3);

    for algorithm in [
        FovAlgorithm::Shadow,
        FovAlgorithm::Symmetric,
        FovAlgorithm::Permissive,
    ] {
        for shape in [
            FovShape::Square,
            FovShape::Diamond,
            FovShape::Circle,
            FovShape::CirclePlus,
        ] {
            let mut previous: Option<BitGrid> = None;

            // Radius 0 means unlimited, so it goes last.
            for radius in (1..=14).chain(std::iter::once(0)) {
                let settings = FovSettings {
                    radius,
                    light_walls: true,
                    algorithm,
                    shape,
                };
                let visible = compute_fov(&opacity, (12, 12), &settings).unwrap();

                if let Some(previous) = &previous {
                    for (x, y) in previous.iter_ones() {
                        assert!(
                            visible.get_bit(x, y),
                            "{:?} {:?} radius {} lost ({}, {})",
                            algorithm,
                            shape,
                            radius,
                            x,
                            y
                        );
                    }
                }
                previous = Some(visible);
            }
        }
    }
}

#[test_log::test]
fn symmetric_fov_is_symmetric_between_open_tiles() {
    for seed in 0..4 {
        let (width, height) = (14, 12);
        let opacity = random_opacity(width, height, seed, 0.3);
        let settings = FovSettings {
            algorithm: FovAlgorithm::Symmetric,
            ..Default::default()
        };
        let open: Vec<(i32, i32)> = Rect::new(0, 0, width, height)
            .iter_positions()
            .filter(|&(x, y)| !opacity.get_bit(x, y))
            .collect();
        let views: Vec<BitGrid> = open
            .iter()
            .map(|&origin| compute_fov(&opacity, origin, &settings).unwrap())
            .collect();

        for (i, &a) in open.iter().enumerate() {
            for (j, &b) in open.iter().enumerate() {
                assert_eq!(
                    views[i].get_bit(b.0, b.1),
                    views[j].get_bit(a.0, a.1),
                    "seed {}: {:?} and {:?}",
                    seed,
                    a,
                    b
                );
            }
        }
    }
}

#[test]
fn a_star_agrees_with_distance_map() {
    for seed in 0..3 {
        let costs = random_costs(20, 15, seed);
        let start = match costs.iter().find(|&(_, _, &c)| c > 0) {
            Some((x, y, _)) => (x, y),
            None => continue,
        };

        for neighborhood in [Neighborhood::cardinal(), Neighborhood::default()] {
            let mut pathfinder = Pathfinder::new(&costs, neighborhood.clone()).unwrap();
            pathfinder.add_root(start.0, start.1).unwrap();
            let distance_map = pathfinder.resolve().unwrap();
            let settings = AStarSettings {
                neighborhood,
                ..Default::default()
            };

            for (x, y, &c) in costs.iter() {
                if c == 0 {
                    continue;
                }

                let path = find_path(&costs, start, (x, y), &settings).unwrap();
                let distance = distance_map.distance(x, y).unwrap();

                match (path, distance) {
                    (Some(path), Some(d)) => {
                        assert!(d >= 0.);
                        assert!((path.cost() - d).abs() < 1e-3, "({}, {})", x, y);
                        assert_eq!(path.first(), Some(start));
                        assert_eq!(path.last(), Some((x, y)));
                    }
                    (None, None) => {}
                    other => panic!("({}, {}) disagrees: {:?}", x, y, other),
                }
            }
        }
    }
}

#[test_log::test]
fn bsp_leaves_tile_the_root() {
    let root = Rect::new(3, -2, 97, 61);

    for seed in 0..10 {
        let settings = BspSettings {
            min_width: 3,
            min_height: 3,
            ..Default::default()
        };
        let tree = BspTree::generate(root, seed, &settings).unwrap();
        let leaves: Vec<Rect> = tree
            .leaves()
            .map(|id| tree.node(id).unwrap().rect())
            .collect();

        let total: i64 = leaves.iter().map(Rect::area).sum();
        assert_eq!(total, root.area());

        for (i, a) in leaves.iter().enumerate() {
            for b in &leaves[i + 1..] {
                assert_eq!(a.intersection(b), None);
            }
        }

        for (x, y) in root.iter_positions() {
            let id = tree.find_node(x, y).unwrap();
            assert!(tree.node(id).unwrap().rect().contains(x, y));
        }

        // Walking again yields the same sequence.
        assert!(tree.leaves().eq(tree.leaves()));
    }
}
