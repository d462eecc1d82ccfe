use std::fmt;

/// A named parameter with its ordered candidate values
#[derive(Clone, Debug, PartialEq)]
pub struct Axis<P> {
    name: &'static str,
    values: Vec<P>,
}

impl<P> Axis<P> {
    pub fn new(name: &'static str, values: Vec<P>) -> Self {
        Axis { name, values }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn values(&self) -> &[P] {
        &self.values
    }
}

/// Ordered list of axes spanning every parameter combination of a suite.
///
/// Combinations are enumerated as a cartesian product in declaration order with the last axis
/// varying fastest. A grid without axes has a single, empty combination.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamGrid<P> {
    axes: Vec<Axis<P>>,
}

impl<P> Default for ParamGrid<P> {
    fn default() -> Self {
        ParamGrid { axes: Vec::new() }
    }
}

impl<P: Clone> ParamGrid<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an axis
    pub fn axis(mut self, name: &'static str, values: Vec<P>) -> Self {
        self.axes.push(Axis::new(name, values));
        self
    }

    pub fn axes(&self) -> &[Axis<P>] {
        &self.axes
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.axes.iter().map(Axis::name).collect()
    }

    /// Number of combinations
    pub fn len(&self) -> usize {
        self.axes.iter().map(|axis| axis.values.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every combination, one value per axis in axis order
    pub fn combinations(&self) -> Vec<Vec<P>> {
        self.axes.iter().fold(vec![Vec::new()], |prefixes, axis| {
            prefixes
                .iter()
                .flat_map(|prefix| {
                    axis.values.iter().map(move |value| {
                        let mut combination = prefix.clone();
                        combination.push(value.clone());
                        combination
                    })
                })
                .collect()
        })
    }
}

/// Display helper printing a combination as `(a, b, c)`
pub struct Combination<'a, P>(pub &'a [P]);

impl<'a, P: fmt::Display> fmt::Display for Combination<'a, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, ")")
    }
}
