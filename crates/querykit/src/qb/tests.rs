//! Compile tests for the qb module.

use super::*;
use crate::error::BuildError;
use crate::params;
use crate::value::Value;

fn sql_and_params(qb: &QueryBuilder) -> (String, Vec<Value>) {
    qb.compile().unwrap().into_parts()
}

fn compile_err(qb: QueryBuilder) -> BuildError {
    qb.compile().unwrap_err()
}

// ==================== Basic kinds ====================

#[test]
fn select_defaults_to_star() {
    assert_eq!(select_from("users").build_sql().unwrap(), "SELECT * FROM users");
}

#[test]
fn select_columns_alias_distinct() {
    let qb = select_from("public.users")
        .alias("u")
        .distinct()
        .columns(["u.id", "u.email"])
        .select_expression("lower(u.name)", Some("name_lc"));
    assert_eq!(
        qb.build_sql().unwrap(),
        "SELECT DISTINCT u.id, u.email, lower(u.name) AS name_lc FROM public.users AS u"
    );
}

#[test]
fn insert_preserves_value_order() {
    let (sql, params) = sql_and_params(&insert_into(
        "users",
        [("email", "a@example.com"), ("name", "Ann")],
    ));
    assert_eq!(sql, "INSERT INTO users (email, name) VALUES ($1, $2)");
    assert_eq!(params, params!["a@example.com", "Ann"]);
}

#[test]
fn insert_with_set_and_expression() {
    let qb = insert_into("events", [("kind", "login")])
        .set("user_id", 7)
        .set_expression("created_at", "now()");
    let (sql, params) = sql_and_params(&qb);
    assert_eq!(
        sql,
        "INSERT INTO events (kind, user_id, created_at) VALUES ($1, $2, now())"
    );
    assert_eq!(params, params!["login", 7]);
}

#[test]
fn update_basic() {
    let qb = update_table("users", [("status", "inactive")])
        .set_expression("login_count", raw("login_count + $1", params![1]))
        .where_eq("id", 42);
    let (sql, params) = sql_and_params(&qb);
    assert_eq!(
        sql,
        "UPDATE users SET status = $1, login_count = login_count + $2 WHERE id = $3"
    );
    assert_eq!(params, params!["inactive", 1, 42]);
}

#[test]
fn delete_basic() {
    let (sql, params) = sql_and_params(&delete_from("sessions").where_field("expires_at", "<", 100));
    assert_eq!(sql, "DELETE FROM sessions WHERE expires_at < $1");
    assert_eq!(params, params![100]);
}

// ==================== Predicates ====================

#[test]
fn grouped_predicates_scenario() {
    let qb = select_from("users")
        .where_field("active", "=", true)
        .where_any_group(|g| {
            g.where_field("role", "=", "admin")
                .where_field("role", "=", "owner")
        })
        .order_by("id", Direction::Asc)
        .limit(10);
    let (sql, params) = sql_and_params(&qb);
    assert_eq!(
        sql,
        "SELECT * FROM users WHERE active = $1 AND (role = $2 OR role = $3) ORDER BY id ASC LIMIT 10"
    );
    assert_eq!(params, params![true, "admin", "owner"]);
}

#[test]
fn deeply_nested_groups_are_parenthesized() {
    let qb = select_from("t").where_any_group(|g| {
        g.where_eq("a", 1).where_all_group(|g| {
            g.where_eq("b", 2)
                .where_any_group(|g| g.where_eq("c", 3).where_eq("d", 4))
        })
    });
    let (sql, params) = sql_and_params(&qb);
    assert_eq!(
        sql,
        "SELECT * FROM t WHERE (a = $1 OR (b = $2 AND (c = $3 OR d = $4)))"
    );
    assert_eq!(params, params![1, 2, 3, 4]);
}

#[test]
fn top_level_predicates_are_and_combined() {
    let qb = select_from("t")
        .where_eq("a", 1)
        .where_all_group(|g| g.where_eq("b", 2).where_eq("c", 3))
        .where_eq("d", 4);
    assert_eq!(
        qb.build_sql().unwrap(),
        "SELECT * FROM t WHERE a = $1 AND (b = $2 AND c = $3) AND d = $4"
    );
}

#[test]
fn empty_group_is_skipped() {
    let qb = select_from("t").where_any_group(|g| g);
    assert_eq!(qb.build_sql().unwrap(), "SELECT * FROM t");
}

#[test]
fn explicit_predicate_tree() {
    let tree = Predicate::any(vec![
        Predicate::eq("role", "admin").unwrap(),
        Predicate::field("karma", ">=", 500).unwrap(),
    ]);
    let qb = select_from("users").where_predicate(tree);
    assert_eq!(
        qb.build_sql().unwrap(),
        "SELECT * FROM users WHERE (role = $1 OR karma >= $2)"
    );
}

#[test]
fn null_values_render_is_null() {
    let qb = select_from("users")
        .where_eq("deleted_at", None::<i64>)
        .where_field("banned_at", "<>", Value::Null)
        .where_not_null("email");
    let (sql, params) = sql_and_params(&qb);
    assert_eq!(
        sql,
        "SELECT * FROM users WHERE deleted_at IS NULL AND banned_at IS NOT NULL AND email IS NOT NULL"
    );
    assert!(params.is_empty());
}

#[test]
fn in_lists_and_ranges() {
    let qb = select_from("items")
        .where_in("id", [1, 2, 3])
        .where_not_in("state", ["gone"])
        .where_between("price", 10, 20)
        .where_not_between("weight", 0, 1);
    let (sql, params) = sql_and_params(&qb);
    assert_eq!(
        sql,
        "SELECT * FROM items WHERE id IN ($1, $2, $3) AND state NOT IN ($4) AND price BETWEEN $5 AND $6 AND weight NOT BETWEEN $7 AND $8"
    );
    assert_eq!(params.len(), 8);
}

#[test]
fn empty_in_lists() {
    let qb = select_from("t")
        .where_in("id", Vec::<i64>::new())
        .where_not_in("id", Vec::<i64>::new());
    assert_eq!(qb.build_sql().unwrap(), "SELECT * FROM t WHERE 1=0 AND 1=1");
}

#[test]
fn like_family_operators() {
    let qb = select_from("users")
        .where_field("name", "ilike", "%ann%")
        .where_field("email", "NOT LIKE", "%@spam.test");
    assert_eq!(
        qb.build_sql().unwrap(),
        "SELECT * FROM users WHERE name ILIKE $1 AND email NOT LIKE $2"
    );
}

#[test]
fn raw_expression_with_identifier_binding() {
    let qb = select_from("users").alias("u").where_expression(
        raw("lower({{col}}) = $1 OR {{col}} IS NULL", params!["ann@example.com"])
            .ident("col", "u.email"),
    );
    let (sql, params) = sql_and_params(&qb);
    assert_eq!(
        sql,
        "SELECT * FROM users AS u WHERE (lower(u.email) = $1 OR u.email IS NULL)"
    );
    assert_eq!(params, params!["ann@example.com"]);
}

// ==================== Subqueries ====================

#[test]
fn in_subquery_splices_parameters_in_place() {
    let sub = select_from("orders")
        .columns(["user_id"])
        .where_field("total", ">", 100);
    let standalone = sub.build_sql().unwrap();
    assert_eq!(standalone, "SELECT user_id FROM orders WHERE total > $1");

    let qb = select_from("users")
        .where_in_subquery("id", sub)
        .where_eq("role", "admin");
    let (sql, params) = sql_and_params(&qb);
    assert_eq!(
        sql,
        format!("SELECT * FROM users WHERE id IN ({standalone}) AND role = $2")
    );
    assert_eq!(params, params![100, "admin"]);
}

#[test]
fn subquery_parameters_interleave_with_outer_ones() {
    let sub = select_from("orders")
        .columns(["user_id"])
        .where_field("total", ">", 100);
    let qb = select_from("users")
        .where_eq("active", true)
        .where_not_in_subquery("id", sub)
        .where_eq("role", "admin");
    let (sql, params) = sql_and_params(&qb);
    assert_eq!(
        sql,
        "SELECT * FROM users WHERE active = $1 AND id NOT IN (SELECT user_id FROM orders WHERE total > $2) AND role = $3"
    );
    assert_eq!(params, params![true, 100, "admin"]);
}

#[test]
fn exists_any_all() {
    let orders = select_from("orders")
        .alias("o")
        .select_expression("1", None)
        .where_expression("o.user_id = u.id");
    let qb = select_from("users").alias("u").where_not_exists(orders);
    assert_eq!(
        qb.build_sql().unwrap(),
        "SELECT * FROM users AS u WHERE NOT EXISTS (SELECT 1 FROM orders AS o WHERE (o.user_id = u.id))"
    );

    let thresholds = select_from("discounts")
        .columns(["threshold"])
        .where_eq("active", true);
    let qb = select_from("products")
        .where_any("price", ">", thresholds.clone())
        .where_all("price", "<=", thresholds);
    let (sql, params) = sql_and_params(&qb);
    assert_eq!(
        sql,
        "SELECT * FROM products WHERE price > ANY (SELECT threshold FROM discounts WHERE active = $1) AND price <= ALL (SELECT threshold FROM discounts WHERE active = $2)"
    );
    assert_eq!(params, params![true, true]);
}

#[test]
fn pattern_match_against_any_subquery() {
    let patterns = select_from("blocked_patterns")
        .columns(["pattern"])
        .where_eq("scope", "email");
    let qb = select_from("users")
        .where_eq("active", true)
        .where_any("email", "ilike", patterns.clone())
        .where_all("name", "NOT LIKE", patterns);
    let (sql, params) = sql_and_params(&qb);
    assert_eq!(
        sql,
        "SELECT * FROM users WHERE active = $1 AND email ILIKE ANY (SELECT pattern FROM blocked_patterns WHERE scope = $2) AND name NOT LIKE ALL (SELECT pattern FROM blocked_patterns WHERE scope = $3)"
    );
    assert_eq!(params, params![true, "email", "email"]);

    let err = compile_err(select_from("t").where_any("a", "IN", select_from("u")));
    assert!(err.is_unsupported_operator());
}

#[test]
fn non_select_subquery_fails_compile() {
    let err = compile_err(select_from("t").where_in_subquery("id", delete_from("x")));
    assert!(matches!(err, BuildError::CompileFailed(_)));

    let err = compile_err(select_from("t").union(update_table("x", [("a", 1)])));
    assert!(matches!(err, BuildError::CompileFailed(_)));
}

#[test]
fn nested_builder_errors_propagate() {
    let bad = select_from("orders").where_eq("total; --", 1);
    let err = compile_err(select_from("users").where_exists(bad));
    assert!(err.is_invalid_identifier());
}

// ==================== Joins ====================

#[test]
fn table_joins() {
    let qb = select_from("users")
        .alias("u")
        .inner_join("orders", Some("o"), "o.user_id", "=", "u.id")
        .join_using(JoinKind::Left, "profiles", None, ["user_id"])
        .full_join("audits", None, "audits.user_id", "=", "u.id")
        .right_join("teams", Some("t"), "t.id", "=", "u.team_id")
        .cross_join("regions", Some("r"));
    assert_eq!(
        qb.build_sql().unwrap(),
        "SELECT * FROM users AS u INNER JOIN orders AS o ON o.user_id = u.id LEFT JOIN profiles USING (user_id) FULL OUTER JOIN audits ON audits.user_id = u.id RIGHT JOIN teams AS t ON t.id = u.team_id CROSS JOIN regions AS r"
    );
}

#[test]
fn subquery_join_target() {
    let totals = select_from("orders")
        .columns(["user_id"])
        .select_expression("sum(total)", Some("spent"))
        .where_eq("status", "paid")
        .group_by("user_id");
    let qb = select_from("users")
        .alias("u")
        .join_subquery(JoinKind::Left, totals, "o", "o.user_id = u.id")
        .where_field("u.score", ">", 5);
    let (sql, params) = sql_and_params(&qb);
    assert_eq!(
        sql,
        "SELECT * FROM users AS u LEFT JOIN (SELECT user_id, sum(total) AS spent FROM orders WHERE status = $1 GROUP BY user_id) AS o ON o.user_id = u.id WHERE u.score > $2"
    );
    assert_eq!(params, params!["paid", 5]);
}

#[test]
fn lateral_joins() {
    let recent = select_from("orders")
        .alias("o")
        .columns(["o.id", "o.total"])
        .where_expression("o.user_id = u.id")
        .order_by("o.created_at", Direction::Desc)
        .limit(3);
    let qb = select_from("users")
        .alias("u")
        .columns(["u.id"])
        .join_lateral(JoinKind::Left, recent.clone(), "recent", "true");
    assert_eq!(
        qb.build_sql().unwrap(),
        "SELECT u.id FROM users AS u LEFT JOIN LATERAL (SELECT o.id, o.total FROM orders AS o WHERE (o.user_id = u.id) ORDER BY o.created_at DESC LIMIT 3) AS recent ON true"
    );

    let qb = select_from("users").alias("u").cross_join_lateral(recent, "r");
    assert!(
        qb.build_sql()
            .unwrap()
            .starts_with("SELECT * FROM users AS u CROSS JOIN LATERAL (SELECT o.id")
    );
}

#[test]
fn join_condition_rules() {
    let err = compile_err(select_from("a").join_on(JoinKind::Inner, "b", None, "a.id", "LIKE", "b.id"));
    assert!(err.is_unsupported_operator());

    let err = compile_err(select_from("a").join_subquery(JoinKind::Cross, select_from("b"), "b", "true"));
    assert!(matches!(err, BuildError::InvalidArgument(_)));

    let err = compile_err(select_from("a").join_using(JoinKind::Inner, "b", None, Vec::<&str>::new()));
    assert!(matches!(err, BuildError::InvalidArgument(_)));
}

// ==================== GROUP BY / HAVING ====================

#[test]
fn group_by_having() {
    let qb = select_from("orders")
        .columns(["user_id"])
        .select_expression("count(*)", Some("n"))
        .group_by_fields(["user_id"])
        .having_expression(raw("count(*) > $1", params![5]))
        .having_any_group(|g| {
            g.where_field("user_id", "<", 10)
                .where_field("user_id", ">", 100)
        });
    let (sql, params) = sql_and_params(&qb);
    assert_eq!(
        sql,
        "SELECT user_id, count(*) AS n FROM orders GROUP BY user_id HAVING (count(*) > $1) AND (user_id < $2 OR user_id > $3)"
    );
    assert_eq!(params, params![5, 10, 100]);
}

// ==================== CTE ====================

#[test]
fn cte_parameters_come_first() {
    let active = select_from("users").where_eq("active", true);
    let qb = select_from("active_users")
        .with_cte("active_users", active)
        .where_eq("role", "admin");
    let (sql, params) = sql_and_params(&qb);
    assert_eq!(
        sql,
        "WITH active_users AS (SELECT * FROM users WHERE active = $1) SELECT * FROM active_users WHERE role = $2"
    );
    assert_eq!(params, params![true, "admin"]);
}

#[test]
fn recursive_cte() {
    let base = select_from("categories")
        .columns(["id", "parent_id"])
        .where_null("parent_id");
    let step = select_from("categories")
        .alias("c")
        .columns(["c.id", "c.parent_id"])
        .inner_join("tree", Some("t"), "c.parent_id", "=", "t.id");
    let qb = select_from("tree")
        .with_cte("roots", select_from("categories").where_null("parent_id"))
        .with_recursive_cte_columns("tree", ["id", "parent_id"], base.union_all(step));
    assert_eq!(
        qb.build_sql().unwrap(),
        "WITH RECURSIVE roots AS (SELECT * FROM categories WHERE parent_id IS NULL), tree (id, parent_id) AS (SELECT id, parent_id FROM categories WHERE parent_id IS NULL UNION ALL (SELECT c.id, c.parent_id FROM categories AS c INNER JOIN tree AS t ON c.parent_id = t.id)) SELECT * FROM tree"
    );
}

#[test]
fn duplicate_cte_name_is_rejected() {
    let err = compile_err(
        select_from("x")
            .with_cte("x", select_from("a"))
            .with_cte("x", select_from("b")),
    );
    assert!(matches!(err, BuildError::InvalidArgument(_)));
}

// ==================== WINDOW / set operations ====================

#[test]
fn named_windows() {
    let qb = select_from("employees")
        .columns(["name"])
        .select_expression("rank() OVER w", Some("r"))
        .window(
            "w",
            raw("PARTITION BY {{dept}} ORDER BY salary DESC", params![]).ident("dept", "department"),
        )
        .window("w2", "ORDER BY hired_at");
    assert_eq!(
        qb.build_sql().unwrap(),
        "SELECT name, rank() OVER w AS r FROM employees WINDOW w AS (PARTITION BY department ORDER BY salary DESC), w2 AS (ORDER BY hired_at)"
    );
}

#[test]
fn set_operations_left_to_right() {
    let qb = select_from("a")
        .columns(["id"])
        .where_eq("x", 1)
        .union(select_from("b").columns(["id"]).where_eq("y", 2))
        .except(select_from("c").columns(["id"]))
        .intersect(select_from("d").columns(["id"]).where_eq("z", 3))
        .order_by("id", Direction::Desc)
        .limit(5);
    let (sql, params) = sql_and_params(&qb);
    assert_eq!(
        sql,
        "((SELECT id FROM a WHERE x = $1 UNION (SELECT id FROM b WHERE y = $2)) EXCEPT (SELECT id FROM c)) INTERSECT (SELECT id FROM d WHERE z = $3) ORDER BY id DESC LIMIT 5"
    );
    assert_eq!(params, params![1, 2, 3]);
}

#[test]
fn union_then_intersect_keeps_insertion_order() {
    let qb = select_from("pa")
        .columns(["id"])
        .union(select_from("pb").columns(["id"]))
        .intersect(select_from("pc").columns(["id"]))
        .order_by("id", Direction::Asc);
    assert_eq!(
        qb.build_sql().unwrap(),
        "(SELECT id FROM pa UNION (SELECT id FROM pb)) INTERSECT (SELECT id FROM pc) ORDER BY id ASC"
    );

    // A single set operation needs no extra grouping.
    let single = select_from("pa").columns(["id"]).intersect(select_from("pc").columns(["id"]));
    assert_eq!(
        single.build_sql().unwrap(),
        "SELECT id FROM pa INTERSECT (SELECT id FROM pc)"
    );
}

#[test]
fn chained_set_operations_nest_inside_subqueries() {
    let inner = select_from("a")
        .columns(["id"])
        .union(select_from("b").columns(["id"]))
        .except(select_from("c").columns(["id"]).where_eq("k", 9));
    let qb = select_from("t").where_eq("flag", true).where_in_subquery("id", inner);
    let (sql, params) = sql_and_params(&qb);
    assert_eq!(
        sql,
        "SELECT * FROM t WHERE flag = $1 AND id IN ((SELECT id FROM a UNION (SELECT id FROM b)) EXCEPT (SELECT id FROM c WHERE k = $2))"
    );
    assert_eq!(params, params![true, 9]);
}

// ==================== ORDER / LIMIT / locking ====================

#[test]
fn order_by_nulls_and_expressions() {
    let qb = select_from("users")
        .where_eq("active", true)
        .order_by_nulls("last_login", Direction::Desc, Nulls::Last)
        .order_by_expression(
            raw("similarity(name, $1)", params!["ann"]),
            Direction::Desc,
            Some(Nulls::First),
        )
        .limit(20)
        .offset(40);
    let (sql, params) = sql_and_params(&qb);
    assert_eq!(
        sql,
        "SELECT * FROM users WHERE active = $1 ORDER BY last_login DESC NULLS LAST, similarity(name, $2) DESC NULLS FIRST LIMIT 20 OFFSET 40"
    );
    assert_eq!(params, params![true, "ann"]);
}

#[test]
fn locking_clauses() {
    let qb = select_from("jobs")
        .where_eq("state", "queued")
        .order_by("id", Direction::Asc)
        .limit(1)
        .for_update_of(["jobs"])
        .skip_locked();
    assert_eq!(
        qb.build_sql().unwrap(),
        "SELECT * FROM jobs WHERE state = $1 ORDER BY id ASC LIMIT 1 FOR UPDATE OF jobs SKIP LOCKED"
    );

    let qb = select_from("jobs").skip_locked();
    assert_eq!(
        qb.build_sql().unwrap(),
        "SELECT * FROM jobs FOR UPDATE SKIP LOCKED"
    );
    assert_eq!(
        select_from("jobs").for_update().build_sql().unwrap(),
        "SELECT * FROM jobs FOR UPDATE"
    );
}

// ==================== RETURNING ====================

#[test]
fn returning_on_mutations() {
    let qb = update_table("users", [("name", "Bob")])
        .where_eq("id", 7)
        .returning_fields(["id", "updated_at"]);
    assert_eq!(
        qb.build_sql().unwrap(),
        "UPDATE users SET name = $1 WHERE id = $2 RETURNING id, updated_at"
    );

    let qb = delete_from("sessions").where_eq("user_id", 1).returning("*");
    assert_eq!(
        qb.build_sql().unwrap(),
        "DELETE FROM sessions WHERE user_id = $1 RETURNING *"
    );
}

// ==================== Upsert ====================

#[test]
fn upsert_do_update_fields() {
    let qb = Dialect::Postgres
        .insert_into("t", [("k", 1)])
        .on_conflict_do_update_fields(["k"], ["v"]);
    let (sql, params) = sql_and_params(&qb);
    assert_eq!(
        sql,
        "INSERT INTO t (k) VALUES ($1) ON CONFLICT (k) DO UPDATE SET v = EXCLUDED.v"
    );
    assert_eq!(params, params![1]);
}

#[test]
fn upsert_do_nothing() {
    let qb = Dialect::Postgres
        .insert_into("t", [("k", 1)])
        .on_conflict_do_nothing();
    assert_eq!(
        qb.build_sql().unwrap(),
        "INSERT INTO t (k) VALUES ($1) ON CONFLICT DO NOTHING"
    );

    let qb = Dialect::Postgres
        .insert_into("t", [("k", 1)])
        .on_conflict_columns_do_nothing(["k"]);
    assert_eq!(
        qb.build_sql().unwrap(),
        "INSERT INTO t (k) VALUES ($1) ON CONFLICT (k) DO NOTHING"
    );
}

#[test]
fn upsert_assignments_filter_and_returning() {
    let qb = Dialect::Postgres
        .insert_into("counters", [("name", Value::from("hits"))])
        .set("n", 1)
        .on_conflict_do_update_assignments(["name"], [("n", raw("counters.n + $1", params![5]))])
        .on_conflict_where(raw("counters.locked = $1", params![false]))
        .returning("n");
    let (sql, params) = sql_and_params(&qb);
    assert_eq!(
        sql,
        "INSERT INTO counters (name, n) VALUES ($1, $2) ON CONFLICT (name) DO UPDATE SET n = counters.n + $3 WHERE (counters.locked = $4) RETURNING n"
    );
    assert_eq!(params, params!["hits", 1, 5, false]);
}

#[test]
fn upsert_on_wrong_kind_or_dialect() {
    let qb = Dialect::Postgres
        .update_table("t", [("k", 1)])
        .on_conflict_do_update_fields(["k"], ["v"]);
    assert!(qb.error().is_some_and(BuildError::is_missing_clause));
    assert!(compile_err(qb).is_missing_clause());

    let qb = insert_into("t", [("k", 1)]).on_conflict_do_nothing();
    assert!(compile_err(qb).is_missing_clause());
}

#[test]
fn upsert_update_requires_target() {
    let qb = Dialect::Postgres
        .insert_into("t", [("k", 1)])
        .on_conflict_do_update_fields(Vec::<&str>::new(), ["v"]);
    assert!(compile_err(qb).is_missing_clause());

    let qb = Dialect::Postgres
        .insert_into("t", [("k", 1)])
        .on_conflict_do_nothing()
        .on_conflict_where("true");
    assert!(compile_err(qb).is_missing_clause());

    let qb = Dialect::Postgres
        .insert_into("t", [("k", 1)])
        .on_conflict_do_update_fields(["k"], ["t.v"]);
    assert!(compile_err(qb).is_invalid_identifier());
}

// ==================== Applicability / validation ====================

#[test]
fn missing_values() {
    let err = compile_err(insert_into("t", Vec::<(&str, Value)>::new()));
    assert!(err.is_missing_clause());
    let err = compile_err(update_table("t", Vec::<(&str, Value)>::new()).where_eq("id", 1));
    assert!(err.is_missing_clause());
}

#[test]
fn inapplicable_clauses() {
    assert!(compile_err(insert_into("t", [("a", 1)]).where_eq("a", 1)).is_missing_clause());
    assert!(compile_err(select_from("t").returning("id")).is_missing_clause());
    assert!(compile_err(delete_from("t").limit(1)).is_missing_clause());
    assert!(compile_err(delete_from("t").group_by("a")).is_missing_clause());
    assert!(compile_err(update_table("t", [("a", 1)]).for_update()).is_missing_clause());
    assert!(compile_err(select_from("t").set("a", 1)).is_missing_clause());
    assert!(
        compile_err(delete_from("t").union(select_from("u"))).is_missing_clause()
    );
}

#[test]
fn duplicate_column_is_invalid_argument() {
    let err = compile_err(insert_into("t", [("a", 1)]).set("a", 2));
    assert!(matches!(err, BuildError::InvalidArgument(_)));
}

#[test]
fn unsafe_identifiers_fail_everywhere() {
    for bad in ["users; DROP TABLE users", "first name", "o'brien", "x\"y", "a\tb"] {
        let cases = [
            select_from(bad),
            select_from("t").alias(bad),
            select_from("t").columns([bad]),
            select_from("t").where_eq(bad, 1),
            select_from("t").where_in(bad, [1]),
            select_from("t").order_by(bad, Direction::Asc),
            select_from("t").group_by(bad),
            select_from("t").inner_join(bad, None, "a", "=", "b"),
            select_from("t").with_cte(bad, select_from("u")),
            select_from("t").window(bad, "ORDER BY id"),
            select_from("t").for_update_of([bad]),
            delete_from("t").returning(bad),
            update_table("t", [(bad, 1)]),
            insert_into("t", [(bad, 1)]),
        ];
        for qb in cases {
            assert!(qb.error().is_some());
            let err = compile_err(qb);
            assert!(err.is_invalid_identifier(), "{bad:?} -> {err:?}");
        }
    }
}

#[test]
fn unsupported_operators_fail() {
    for bad in ["==", "~", "; DROP", "= ANY", "<=>"] {
        assert!(compile_err(select_from("t").where_field("a", bad, 1)).is_unsupported_operator());
        assert!(compile_err(select_from("t").having_field("a", bad, 1)).is_unsupported_operator());
        assert!(
            compile_err(select_from("t").where_any("a", bad, select_from("u")))
                .is_unsupported_operator()
        );
    }
}

#[test]
fn first_error_is_kept() {
    let qb = select_from("t")
        .where_field("a b", "=", 1)
        .where_field("c", "~", 1);
    assert!(compile_err(qb).is_invalid_identifier());
}

#[test]
fn raw_expression_injection_is_rejected() {
    let err = compile_err(select_from("users").where_expression("1=1; DROP TABLE users"));
    assert!(matches!(err, BuildError::InvalidArgument(_)));

    let err = compile_err(select_from("users").where_expression(raw("a = $1", params![])));
    assert!(matches!(err, BuildError::InvalidArgument(_)));
}

// ==================== Compile properties ====================

#[test]
fn compile_is_idempotent() {
    let qb = Dialect::Postgres
        .select_from("users")
        .alias("u")
        .with_cte("t", select_from("teams").where_eq("active", true))
        .inner_join("t", None, "t.id", "=", "u.team_id")
        .where_eq("u.active", true)
        .where_any_group(|g| g.where_in("u.role", ["admin", "owner"]).where_null("u.role"))
        .order_by("u.id", Direction::Asc)
        .limit(10);
    let first = qb.compile().unwrap();
    let second = qb.compile().unwrap();
    assert_eq!(first, second);
}

#[test]
fn placeholder_count_matches_equality_calls() {
    for n in 0..12usize {
        let mut qb = select_from("t");
        for i in 0..n {
            qb = qb.where_eq(&format!("c{i}"), i as i64);
        }
        let (sql, params) = sql_and_params(&qb);
        assert_eq!(sql.matches('$').count(), n);
        assert_eq!(params.len(), n);
        for i in 0..n {
            assert!(sql.contains(&format!("c{i} = ${}", i + 1)), "{sql}");
            assert_eq!(params[i], Value::Int(i as i64));
        }
    }
}

#[test]
fn fingerprint_ignores_values() {
    let a = select_from("users").where_eq("id", 1).compile().unwrap();
    let b = select_from("users").where_eq("id", 2).compile().unwrap();
    let c = select_from("users").where_eq("email", 2).compile().unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.params(), b.params());
    assert_ne!(a.fingerprint(), c.fingerprint());
}
