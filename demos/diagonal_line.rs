use neighbor_tree::tree::{NeighborTree, SearchMode};
use tracing::{info, Level};

fn main() {
    if !std::env::var("DEBUG_NEIGHBOR_TREE").is_ok()
        || !std::env::var("DEBUG_NEIGHBOR_TREE").is_ok()
            && (std::env::var("DEBUG_NEIGHBOR_TREE").unwrap() == "0"
                || std::env::var("DEBUG_NEIGHBOR_TREE").unwrap() == "false"
                || std::env::var("DEBUG_NEIGHBOR_TREE").unwrap() == "")
    {
        // Disable logging
    } else {
        tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();
    }

    println!("{}", "=".repeat(100));
    println!("NeighborTree Example: diagonal line");

    let dim = 3;
    let count = 100;
    let mut tree = NeighborTree::new(dim, count);
    tree.resize(count).unwrap();
    for id in 0..count {
        for k in 0..dim {
            tree.set_position(id, k, id as f64).unwrap();
        }
    }
    info!("Building tree over {} particles", count);
    tree.update_tree().unwrap();

    let query = [5.0, 5.0, 5.0];
    let radius = 2.0;
    info!("Searching for neighbors of {:?} within radius {}", query, radius);
    let mut found = Vec::new();
    tree.find_neighbors(&query, radius, SearchMode::Gather, &mut found, true)
        .unwrap();
    found.sort_unstable();
    println!("Neighbors of {:?} within radius {}: {:?}", query, radius, found);

    let box_sides = [100.0, 100.0, 100.0];
    let periodic_query = [1.0, 1.0, 1.0];
    info!("Searching periodically for neighbors of {:?}", periodic_query);
    let mut periodic_found = Vec::new();
    tree.find_neighbors_periodic(
        &periodic_query,
        10.0,
        SearchMode::Gather,
        &box_sides,
        &mut periodic_found,
        true,
    )
    .unwrap();
    periodic_found.sort_unstable();
    println!(
        "Periodic neighbors of {:?} within radius 10: {:?}",
        periodic_query, periodic_found
    );
}
