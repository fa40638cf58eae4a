use indoc::indoc;

/// Name of the table the generated queries materialize into.
pub const OUTPUT_TABLE_NAME: &str = "cs44_graphsql_output";

/// Names the templates define themselves.
pub const RESERVED_NAMES: [&str; 6] = [
    OUTPUT_TABLE_NAME,
    "edge",
    "solution",
    "adj",
    "walk",
    "distance",
];

/// Enumerates k-cliques.
///
/// `solution` keeps the chosen vertices right-aligned in the slots `v1..vk`,
/// padded with zeros on the left. The pads are `a - a` so they share the
/// vertex column type. Every step shifts `v1` out, appends a
/// neighbour of `vk` that is larger than `vk` and adjacent to all live
/// earlier slots. `d` counts the edges walked, so a row is a full clique at
/// `d = k - 1`.
pub const CLIQUE_TEMPLATE: &str = indoc! {"
    -- %K%-cliques of %TABLE%(%SOURCE%, %DESTINATION%)
    DROP TABLE IF EXISTS %OUTPUT%;
    CREATE TABLE %OUTPUT% AS
    WITH RECURSIVE edge (a, b) AS
    (
        SELECT %SOURCE%, %DESTINATION% FROM %TABLE% WHERE %SOURCE% < %DESTINATION%
        UNION
        SELECT %DESTINATION%, %SOURCE% FROM %TABLE% WHERE %DESTINATION% < %SOURCE%
    ),
    solution (%V%, d) AS
    (
        SELECT %0%a, b, 1
        FROM edge
        UNION ALL
        SELECT %SOLUTION.V%, edge.b, solution.d + 1
        FROM solution
        JOIN edge ON edge.a = solution.v%K%
        WHERE solution.d < %DEPTH%
          AND %LOOP%
    )
    SELECT %V%
    FROM solution
    WHERE d = %DEPTH% AND %V<V%
    ORDER BY %V%;
"};

/// Vertex pairs at the largest shortest distance reachable within k hops.
pub const DIAMETER_TEMPLATE: &str = indoc! {"
    -- diameter of %TABLE%(%SOURCE%, %DESTINATION%) within %K% hops
    DROP TABLE IF EXISTS %OUTPUT%;
    CREATE TABLE %OUTPUT% AS
    WITH RECURSIVE edge (a, b) AS
    (
        SELECT %SOURCE%, %DESTINATION% FROM %TABLE% WHERE %SOURCE% <> %DESTINATION%
        UNION
        SELECT %DESTINATION%, %SOURCE% FROM %TABLE% WHERE %SOURCE% <> %DESTINATION%
    ),
    walk (v1, v2, d) AS
    (
        SELECT a, b, 1
        FROM edge
        UNION
        SELECT walk.v1, edge.b, walk.d + 1
        FROM walk
        JOIN edge ON edge.a = walk.v2
        WHERE walk.d < %K% AND edge.b <> walk.v1
    ),
    distance (v1, v2, d) AS
    (
        SELECT v1, v2, MIN(d)
        FROM walk
        GROUP BY v1, v2
    )
    SELECT v1, v2, d
    FROM distance
    WHERE v1 < v2 AND d = (SELECT MAX(d) FROM distance)
    ORDER BY v1, v2;
"};
