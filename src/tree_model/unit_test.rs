#[cfg(test)]
mod tests {
    use super::super::split::{best_split, split_candidate};
    use super::super::*;
    use crate::{
        Attribute, Example, PredictError, RegressionModel, TrainingDataError, TrainingSet,
        TreeSettings, Value,
    };
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1, Array2, Axis};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand_chacha::ChaCha20Rng;

    fn continuous_set(columns: &[&[f64]], y: &[f64]) -> TrainingSet {
        let names = ["A", "B", "C"];
        let attributes = (0..columns.len())
            .map(|j| Attribute::continuous(names[j], j))
            .collect();
        let examples = y
            .iter()
            .enumerate()
            .map(|(i, target)| {
                Example::new(
                    columns.iter().map(|c| Value::Number(c[i])).collect(),
                    *target,
                )
            })
            .collect();
        TrainingSet::new(
            attributes,
            Attribute::continuous("y", columns.len()),
            examples,
        )
        .unwrap()
    }

    fn four_examples() -> TrainingSet {
        continuous_set(&[&[2., 1., 2., 1.]], &[100., 10., 102., 12.])
    }

    fn random_set(n: usize, seed: u64) -> TrainingSet {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let x = Array2::<f64>::random_using((n, 2), Uniform::new(0., 8.), &mut rng)
            .mapv(f64::floor);
        let y = Array1::<f64>::random_using(n, Uniform::new(-50., 50.), &mut rng);
        let shapes = ["circle", "square", "triangle"];
        let examples = x
            .axis_iter(Axis(0))
            .zip(y.iter())
            .map(|(row, target)| {
                let shape = shapes[row[1] as usize % shapes.len()];
                Example::new(vec![Value::Number(row[0]), Value::from(shape)], *target)
            })
            .collect();
        TrainingSet::new(
            vec![
                Attribute::continuous("width", 0),
                Attribute::discrete("shape", 1, shapes),
            ],
            Attribute::continuous("height", 2),
            examples,
        )
        .unwrap()
    }

    fn preorder<'a>(tree: &'a RegressionTree, nodes: &mut Vec<&'a Node>) {
        nodes.push(tree.root());
        for child in tree.children() {
            preorder(child, nodes);
        }
    }

    #[test]
    fn four_examples_give_two_leaves() {
        let mut set = four_examples();
        let tree = RegressionTree::learn_with(&mut set, &TreeSettings { leaf_percent: 25 });
        let Node::Split(root) = tree.root() else {
            panic!("root should split");
        };
        assert_eq!(root.kind(), SplitKind::Continuous);
        assert_eq!(root.attribute().name(), "A");
        assert_eq!(root.branches().len(), 2);
        assert_eq!(root.branch(0).split_value(), &Value::Number(1.));
        assert_eq!(root.branch(0).comparator(), Comparator::LessOrEqual);
        assert_eq!(root.branch(1).comparator(), Comparator::Greater);
        assert_eq!(root.query(), "0:A<=1\n1:A>1");
        assert_abs_diff_eq!(root_error(&tree), 4., epsilon = 1e-9);

        let leaves = tree
            .children()
            .iter()
            .map(|child| match child.root() {
                Node::Leaf(leaf) => leaf.predicted_value(),
                Node::Split(_) => panic!("children should be leaves"),
            })
            .collect::<Vec<_>>();
        assert_eq!(leaves, [11., 101.]);
        assert_eq!(tree.number_of_nodes(), 3);
        assert_eq!(tree.depth(), 2);
    }

    fn root_error(tree: &RegressionTree) -> f64 {
        tree.root().error()
    }

    #[test]
    fn rendering() {
        let mut set = four_examples();
        let tree = RegressionTree::learn_with(&mut set, &TreeSettings { leaf_percent: 25 });
        assert_eq!(tree.rules(), ["A<=1 ==> Class=11", "A>1 ==> Class=101"]);
        assert_eq!(
            tree.to_string(),
            "CONTINUOUS SPLIT #0: attribute=A [Examples:0-3] split error:4\n\
             \tchild 0 split value<=1 [Examples:0-1]\n\
             \tchild 1 split value>1 [Examples:2-3]\n\
             LEAF #1: class=11 [Examples:0-1] error:2\n\
             LEAF #2: class=101 [Examples:2-3] error:2\n"
        );
    }

    #[test]
    fn nested_rules_join_conditions() {
        let levels = ["low", "low", "low", "low", "high", "high", "high", "high"];
        let b = [1., 1., 2., 2., 1., 1., 2., 2.];
        let y = [0., 0., 10., 10., 100., 100., 100., 100.];
        let examples = (0..8)
            .map(|i| Example::new(vec![Value::from(levels[i]), Value::Number(b[i])], y[i]))
            .collect();
        let mut set = TrainingSet::new(
            vec![
                Attribute::discrete("A", 0, ["low", "high"]),
                Attribute::continuous("B", 1),
            ],
            Attribute::continuous("y", 2),
            examples,
        )
        .unwrap();
        let tree = RegressionTree::learn_with(&mut set, &TreeSettings { leaf_percent: 25 });
        assert_eq!(
            tree.rules(),
            [
                "A=high ==> Class=100",
                "A=low AND B<=1 ==> Class=0",
                "A=low AND B>1 ==> Class=10"
            ]
        );
        assert_eq!(tree.rules().len(), tree.number_of_nodes() - count_splits(&tree));
    }

    fn count_splits(tree: &RegressionTree) -> usize {
        let mut nodes = Vec::new();
        preorder(tree, &mut nodes);
        nodes.iter().filter(|node| !node.is_leaf()).count()
    }

    #[test]
    fn identical_values_have_no_split() {
        let mut set = continuous_set(&[&[3., 3., 3., 3.]], &[1., 2., 3., 4.]);
        let attribute = set.explanatory_attribute(0).clone();
        assert_eq!(
            split_candidate(&mut set, 0, 3, &attribute).map(|c| c.error),
            Err(NoViableSplit)
        );
        let tree = RegressionTree::learn_with(&mut set, &TreeSettings { leaf_percent: 0 });
        assert!(tree.root().is_leaf());
        assert_abs_diff_eq!(tree.predict(&[Value::Number(3.)]).unwrap(), 2.5);
    }

    #[test]
    fn any_attribute_without_split_makes_a_leaf() {
        let mut set = continuous_set(&[&[1., 2., 3., 4.], &[7., 7., 7., 7.]], &[1., 2., 30., 40.]);
        assert_eq!(best_split(&mut set, 0, 3).map(|c| c.error), Err(NoViableSplit));
        let tree = RegressionTree::learn_with(&mut set, &TreeSettings { leaf_percent: 0 });
        assert!(tree.root().is_leaf());
    }

    #[test]
    fn discrete_branches_are_contiguous_runs() {
        let mut set = random_set(40, 7);
        let attribute = set.explanatory_attribute(1).clone();
        let (begin, end) = (5, 34);
        let candidate = split_candidate(&mut set, begin, end, &attribute).unwrap();
        assert_eq!(candidate.kind, SplitKind::Discrete);
        let mut distinct = (begin..=end)
            .map(|i| set.explanatory_value(i, 1).clone())
            .collect::<Vec<_>>();
        distinct.dedup();
        assert_eq!(candidate.branches.len(), distinct.len());

        let mut next = begin;
        for (child, branch) in candidate.branches.iter().enumerate() {
            assert_eq!(branch.child_number(), child);
            assert_eq!(branch.begin(), next);
            assert_eq!(branch.comparator(), Comparator::Equal);
            for i in branch.begin()..=branch.end() {
                assert_eq!(set.explanatory_value(i, 1), branch.split_value());
            }
            next = branch.end() + 1;
        }
        assert_eq!(next, end + 1);
        let error = candidate
            .branches
            .iter()
            .map(|b| set.sum_of_squared_errors(b.begin(), b.end()))
            .sum::<f64>();
        assert_abs_diff_eq!(candidate.error, error, epsilon = 1e-9);
    }

    #[test]
    fn single_example_right_branch_is_dropped() {
        let mut set = continuous_set(&[&[1., 9., 1., 1.]], &[0., 50., 1., 2.]);
        let attribute = set.explanatory_attribute(0).clone();
        let candidate = split_candidate(&mut set, 0, 3, &attribute).unwrap();
        assert_eq!(candidate.branches.len(), 1);
        assert_eq!(
            (candidate.branches[0].begin(), candidate.branches[0].end()),
            (0, 2)
        );
        assert_abs_diff_eq!(candidate.error, 2., epsilon = 1e-9);

        let tree = RegressionTree::learn_with(&mut set, &TreeSettings { leaf_percent: 0 });
        assert!(tree.root().is_leaf());
        assert_abs_diff_eq!(tree.predict(&[Value::Number(9.)]).unwrap(), 13.25);
    }

    #[test]
    fn small_ranges_become_leaves() {
        assert_eq!(regression_tree_leaf_threshold(25, 10), 2);
        assert_eq!(regression_tree_leaf_threshold(9, 10), 0);
        let mut set = random_set(30, 3);
        let tree = RegressionTree::learn_with(&mut set, &TreeSettings { leaf_percent: 100 });
        assert!(tree.root().is_leaf());
        assert_eq!((tree.root().begin(), tree.root().end()), (0, 29));

        let mut set = random_set(60, 4);
        let threshold = regression_tree_leaf_threshold(60, 20);
        let tree = RegressionTree::learn_with(&mut set, &TreeSettings { leaf_percent: 20 });
        let mut nodes = Vec::new();
        preorder(&tree, &mut nodes);
        for node in nodes.iter().filter(|node| !node.is_leaf()) {
            assert!(node.end() - node.begin() + 1 > threshold);
        }
    }

    fn regression_tree_leaf_threshold(examples: usize, percent: usize) -> usize {
        super::super::regression_tree::leaf_threshold(examples, percent)
    }

    #[test]
    fn leaves_and_splits_match_their_examples() {
        for seed in 0..10 {
            let mut set = random_set(80, seed);
            let tree = RegressionTree::learn(&mut set);
            let mut nodes = Vec::new();
            preorder(&tree, &mut nodes);
            for node in nodes {
                match node {
                    Node::Leaf(leaf) => {
                        let (begin, end) = (node.begin(), node.end());
                        let values = (begin..=end).map(|i| set.class_value(i)).collect::<Vec<_>>();
                        let mean = values.iter().sum::<f64>() / values.len() as f64;
                        assert_abs_diff_eq!(leaf.predicted_value(), mean, epsilon = 1e-9);
                        assert_abs_diff_eq!(
                            node.error(),
                            set.sum_of_squared_errors(begin, end),
                            epsilon = 1e-6
                        );
                    }
                    Node::Split(split) => {
                        assert!(split.branches().len() > 1);
                        let error = split
                            .branches()
                            .iter()
                            .map(|b| set.sum_of_squared_errors(b.begin(), b.end()))
                            .sum::<f64>();
                        assert_abs_diff_eq!(node.error(), error, epsilon = 1e-6);
                    }
                }
            }
        }
    }

    #[test]
    fn ids_follow_preorder() {
        let mut set = random_set(100, 11);
        let tree = RegressionTree::learn(&mut set);
        let mut nodes = Vec::new();
        preorder(&tree, &mut nodes);
        let ids = nodes.iter().map(|node| node.id()).collect::<Vec<_>>();
        assert_eq!(ids, (0..nodes.len()).collect::<Vec<_>>());
        assert!(nodes.len() > 1);
    }

    #[test]
    fn first_attribute_wins_ties() {
        let column = [1., 1., 2., 2., 3., 3.];
        let y = [1., 2., 10., 11., 30., 31.];
        let mut set = continuous_set(&[&column, &column], &y);
        let best = best_split(&mut set, 0, 5).unwrap();
        assert_eq!(best.attribute.name(), "A");

        let noise = [4., 1., 3., 2., 4., 1.];
        let mut set = continuous_set(&[&noise, &column], &y);
        let best = best_split(&mut set, 0, 5).unwrap();
        assert_eq!(best.attribute.name(), "B");
        // the range ends up ordered by the winner
        for i in 0..5 {
            assert!(set.explanatory_value(i, 1) <= set.explanatory_value(i + 1, 1));
        }
    }

    #[test]
    fn near_ties_within_epsilon_keep_the_first_attribute() {
        let a = [1., 2., 1., 2.];
        let b = [1., 1., 2., 2.];
        // A scores 4e-6 and B 1e-6: B is better but not by EPSILON
        let mut set = continuous_set(&[&a, &b], &[0., 0.001, 0.002, 0.003]);
        let best = best_split(&mut set, 0, 3).unwrap();
        assert_eq!(best.attribute.name(), "A");
        assert_abs_diff_eq!(best.error, 4e-6, epsilon = 1e-12);

        // ten times the spread: 4e-4 against 1e-4
        let mut set = continuous_set(&[&a, &b], &[0., 0.01, 0.02, 0.03]);
        let best = best_split(&mut set, 0, 3).unwrap();
        assert_eq!(best.attribute.name(), "B");
        assert_abs_diff_eq!(best.error, 1e-4, epsilon = 1e-12);
    }

    #[test]
    fn signed_zeros_share_a_branch() {
        let mut set = continuous_set(&[&[-0., 0., -0., 0.]], &[1., 2., 3., 4.]);
        let attribute = set.explanatory_attribute(0).clone();
        assert_eq!(
            split_candidate(&mut set, 0, 3, &attribute).map(|c| c.error),
            Err(NoViableSplit)
        );

        let mut set = continuous_set(&[&[-0., 1., 0., 1.]], &[1., 30., 3., 40.]);
        let tree = RegressionTree::learn_with(&mut set, &TreeSettings { leaf_percent: 0 });
        let Node::Split(root) = tree.root() else {
            panic!("root should split");
        };
        assert_eq!(root.branches().len(), 2);
        assert_eq!(root.branches()[0].begin(), 0);
        assert_eq!(root.branches()[0].end(), 1);
        assert_eq!(
            root.branches()[0].to_string(),
            "child 0 split value<=0 [Examples:0-1]"
        );
        assert_eq!(tree.predict(&[Value::Number(-0.)]).unwrap(), 2.);
        assert_eq!(tree.predict(&[Value::Number(0.)]).unwrap(), 2.);
        assert_eq!(tree.predict(&[Value::Number(1.)]).unwrap(), 35.);
    }

    #[test]
    fn predict_routes_rows() {
        let mut set = random_set(120, 5);
        let original = set.clone();
        let tree = RegressionTree::learn(&mut set);
        for example in original.examples() {
            // rows of a dropped single-example branch match no branch
            let Ok(prediction) = tree.predict(example.values()) else {
                continue;
            };
            // the walk through the same branches agrees
            let mut walk = tree.walk();
            loop {
                match walk.state() {
                    crate::WalkState::Answer(value) => {
                        assert_eq!(value, prediction);
                        break;
                    }
                    crate::WalkState::AwaitingChoice(split) => {
                        let value = example.value(split.attribute().index());
                        let child = split.test_condition(value).unwrap();
                        walk.choose(child as i32).unwrap();
                    }
                }
            }
        }
    }

    #[test]
    fn predict_rejects_unexpected_rows() {
        let mut set = random_set(60, 9);
        let tree = RegressionTree::learn(&mut set);
        let Node::Split(_) = tree.root() else {
            panic!("root should split");
        };
        assert!(matches!(
            tree.predict(&[]),
            Err(PredictError::Arity { got: 0, .. })
        ));

        let mut set = four_examples();
        let tree = RegressionTree::learn_with(&mut set, &TreeSettings { leaf_percent: 25 });
        assert!(matches!(
            tree.predict(&[Value::from("wide")]),
            Err(PredictError::UnknownValue { .. })
        ));

        let mut set = TrainingSet::new(
            vec![Attribute::discrete("shape", 0, ["circle", "square"])],
            Attribute::continuous("area", 1),
            vec![
                Example::new(vec![Value::from("circle")], 3.),
                Example::new(vec![Value::from("square")], 4.),
            ],
        )
        .unwrap();
        let tree = RegressionTree::learn(&mut set);
        assert_eq!(tree.predict(&[Value::from("square")]), Ok(4.));
        assert_eq!(
            tree.predict(&[Value::from("hexagon")]),
            Err(PredictError::UnknownValue {
                attribute: String::from("shape"),
                value: String::from("hexagon"),
            })
        );
    }

    #[test]
    fn model_fits_piecewise_constant_data() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let x = Array2::<f64>::random_using((60, 2), Uniform::new(0., 6.), &mut rng);
        let y = x.column(0).mapv(|v| if v < 3. { 5. } else { -5. });
        let mut model = RegressionTreeModel::default();
        assert_eq!(model.predict(&x), Err(PredictError::NotFitted));
        model.fit(&x, &y).unwrap();
        assert!(model.tree().is_some());
        assert_eq!(model.predict(&x).unwrap(), y);
        assert_eq!(
            model.predict(&array![[0.5, 2.], [5.5, 1.]]).unwrap(),
            array![5., -5.]
        );
    }

    #[test]
    fn model_rejects_bad_shapes() {
        let mut model = RegressionTreeModel::new(TreeSettings::default());
        assert!(matches!(
            model.fit(&array![[1.], [2.]], &array![1.]),
            Err(TrainingDataError::LengthMismatch {
                rows: 2,
                targets: 1
            })
        ));
        assert!(matches!(
            model.fit(&Array2::zeros((0, 1)), &Array1::zeros(0)),
            Err(TrainingDataError::NoExamples)
        ));
    }
}
