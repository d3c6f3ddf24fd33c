use plaza_app::domains::world::*;
use uuid::Uuid;

#[cfg(test)]
mod grid_model_tests {
    use super::*;

    fn test_grid() -> GridModel {
        GridModel::new(GridConfig::new(
            10,
            10,
            [Cell::new(2, 3), Cell::new(5, 5)],
        ))
    }

    #[test]
    fn test_free_cell_is_walkable() {
        let grid = test_grid();
        assert!(grid.is_walkable(Cell::new(0, 0), Uuid::new_v4()));
        assert!(grid.is_walkable(Cell::new(9, 9), Uuid::new_v4()));
    }

    #[test]
    fn test_out_of_bounds_is_never_walkable() {
        let grid = test_grid();
        let asking = Uuid::new_v4();
        assert!(!grid.is_walkable(Cell::new(-1, 0), asking));
        assert!(!grid.is_walkable(Cell::new(0, -1), asking));
        assert!(!grid.is_walkable(Cell::new(10, 0), asking));
        assert!(!grid.is_walkable(Cell::new(0, 10), asking));
    }

    #[test]
    fn test_obstacle_is_not_walkable() {
        let grid = test_grid();
        assert!(!grid.is_walkable(Cell::new(2, 3), Uuid::new_v4()));
        assert!(grid.is_obstacle(Cell::new(5, 5)));
    }

    #[test]
    fn test_cell_occupied_by_other_is_not_walkable() {
        let mut grid = test_grid();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        grid.place(owner, Cell::new(4, 4));

        assert!(!grid.is_walkable(Cell::new(4, 4), other));
        // The owner can stand where it already stands
        assert!(grid.is_walkable(Cell::new(4, 4), owner));
    }

    #[test]
    fn test_place_overwrites_previous_claim() {
        let mut grid = test_grid();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let contested = Cell::new(5, 6);

        grid.place(first, contested);
        grid.place(second, contested);

        // Last write wins; exactly one occupant remains
        assert_eq!(grid.occupant(contested), Some(second));
        assert_eq!(grid.occupied_cells().count(), 1);
    }

    #[test]
    fn test_release_requires_matching_owner() {
        let mut grid = test_grid();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let cell = Cell::new(1, 1);

        grid.place(owner, cell);
        grid.release(other, cell);
        assert_eq!(grid.occupant(cell), Some(owner));

        grid.release(owner, cell);
        assert_eq!(grid.occupant(cell), None);
    }

    #[test]
    fn test_release_is_a_noop_on_obstacles() {
        let mut grid = test_grid();
        let avatar = Uuid::new_v4();
        grid.release(avatar, Cell::new(2, 3));
        assert!(grid.is_obstacle(Cell::new(2, 3)));
    }

    #[test]
    fn test_snapshot_is_independent_of_the_live_grid() {
        let mut grid = test_grid();
        let avatar = Uuid::new_v4();
        grid.place(avatar, Cell::new(3, 3));

        let mut snapshot = grid.snapshot();
        snapshot.vacate(Cell::new(3, 3));
        snapshot.place(avatar, Cell::new(6, 6));

        assert_eq!(grid.occupant(Cell::new(3, 3)), Some(avatar));
        assert_eq!(grid.occupant(Cell::new(6, 6)), None);
    }

    #[test]
    fn test_vacate_removes_any_owner() {
        let mut grid = test_grid();
        let avatar = Uuid::new_v4();
        grid.place(avatar, Cell::new(7, 7));
        grid.vacate(Cell::new(7, 7));
        assert_eq!(grid.occupant(Cell::new(7, 7)), None);
    }
}

#[cfg(test)]
mod cell_tests {
    use super::*;

    #[test]
    fn test_cell_maps_to_cell_center_in_world_space() {
        let position = Cell::new(4, 7).to_world();
        assert_eq!(position.x, 4.5);
        assert_eq!(position.y, 0.5);
        assert_eq!(position.z, 7.5);
    }

    #[test]
    fn test_world_round_trip_returns_the_same_cell() {
        for cell in [Cell::new(0, 0), Cell::new(9, 3), Cell::new(2, 8)] {
            assert_eq!(Cell::from_world(&cell.to_world()), cell);
        }
    }

    #[test]
    fn test_manhattan_distance() {
        assert_eq!(Cell::new(0, 0).manhattan_distance(&Cell::new(3, 4)), 7);
        assert_eq!(Cell::new(5, 5).manhattan_distance(&Cell::new(5, 5)), 0);
        assert_eq!(Cell::new(4, 1).manhattan_distance(&Cell::new(1, 1)), 3);
    }
}

#[cfg(test)]
mod avatar_tests {
    use super::*;

    #[test]
    fn test_avatar_color_hex_values() {
        assert_eq!(AvatarColor::Blue.hex(), "#3498db");
        assert_eq!(AvatarColor::Red.hex(), "#e74c3c");
        assert_eq!(AvatarColor::default(), AvatarColor::Blue);
    }

    #[test]
    fn test_avatar_serialization() {
        let avatar = Avatar::new(Uuid::new_v4(), "ana", Cell::new(1, 2), AvatarColor::Red);
        let json = serde_json::to_value(&avatar).unwrap();
        assert_eq!(json["cell"]["x"], 1);
        assert_eq!(json["color"], "red");
    }
}
