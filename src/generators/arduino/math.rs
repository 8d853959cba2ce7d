use crate::error::Result;
use crate::workspace::BlockId;

use super::{ArduinoCode, ArduinoGenerator, Order, expr};

const IS_PRIME: &str = "boolean mathIsPrime(double value) {\n  \
    long n = (long)value;\n  \
    if (n != value || n < 2) return false;\n  \
    if (n == 2 || n == 3) return true;\n  \
    if (n % 2 == 0 || n % 3 == 0) return false;\n  \
    for (long i = 5; i * i <= n; i += 6) {\n    \
    if (n % i == 0 || n % (i + 2) == 0) return false;\n  \
    }\n  \
    return true;\n\
    }\n";

impl ArduinoGenerator<'_> {
    pub(super) fn math_number(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let raw = self.field(block, "NUM");
        match raw.trim().parse::<f64>() {
            Ok(v) if v == f64::INFINITY => expr("INFINITY", Order::Atomic),
            Ok(v) if v == f64::NEG_INFINITY => expr("-INFINITY", Order::UnaryPrefix),
            Ok(v) if v < 0.0 => expr(raw.trim(), Order::UnaryPrefix),
            Ok(_) => expr(raw.trim(), Order::Atomic),
            Err(_) => expr("0", Order::Atomic),
        }
    }

    pub(super) fn math_arithmetic(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let op = self.field(block, "OP");
        if op == "POWER" {
            let a = self.value_or(block, "A", Order::None, "0")?;
            let b = self.value_or(block, "B", Order::None, "0")?;
            return expr(format!("pow({a}, {b})"), Order::UnaryPostfix);
        }
        // Right operands of `-`, `*` and `/` bind one level tighter so
        // `a - (b - c)` and `a * (b / c)` keep their parentheses.
        let (symbol, order, right) = match op.as_str() {
            "MINUS" => ("-", Order::Additive, Order::Multiplicative),
            "MULTIPLY" => ("*", Order::Multiplicative, Order::UnaryPrefix),
            "DIVIDE" => ("/", Order::Multiplicative, Order::UnaryPrefix),
            _ => ("+", Order::Additive, Order::Additive),
        };
        let a = self.value_or(block, "A", order, "0")?;
        let b = self.value_or(block, "B", right, "0")?;
        expr(format!("{a} {symbol} {b}"), order)
    }

    pub(super) fn math_single(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let op = self.field(block, "OP");
        if op == "NEG" {
            let arg = self.value_or(block, "NUM", Order::UnaryPrefix, "0")?;
            // `--x` would be a decrement.
            let code = if arg.starts_with('-') { format!("-({arg})") } else { format!("-{arg}") };
            return expr(code, Order::UnaryPrefix);
        }
        let arg = self.value_or(block, "NUM", Order::None, "0")?;
        let code = match op.as_str() {
            "ABS" => format!("abs({arg})"),
            "LN" => format!("log({arg})"),
            "LOG10" => format!("log10({arg})"),
            "EXP" => format!("exp({arg})"),
            "POW10" => format!("pow(10, {arg})"),
            _ => format!("sqrt({arg})"),
        };
        expr(code, Order::UnaryPostfix)
    }

    /// Trigonometry in degrees, as the editor presents it.
    pub(super) fn math_trig(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let op = self.field(block, "OP");
        match op.as_str() {
            "ASIN" | "ACOS" | "ATAN" => {
                let arg = self.value_or(block, "NUM", Order::None, "0")?;
                let func = op.to_ascii_lowercase();
                expr(format!("{func}({arg}) / PI * 180"), Order::Multiplicative)
            }
            _ => {
                let arg = self.value_or(block, "NUM", Order::Multiplicative, "0")?;
                let func = match op.as_str() {
                    "COS" => "cos",
                    "TAN" => "tan",
                    _ => "sin",
                };
                expr(format!("{func}({arg} / 180 * PI)"), Order::UnaryPostfix)
            }
        }
    }

    pub(super) fn math_constant(&mut self, block: BlockId) -> Result<ArduinoCode> {
        match self.field(block, "CONSTANT").as_str() {
            "E" => expr("M_E", Order::Atomic),
            "GOLDEN_RATIO" => expr("(1 + sqrt(5)) / 2", Order::Multiplicative),
            "SQRT2" => expr("M_SQRT2", Order::Atomic),
            "SQRT1_2" => expr("M_SQRT1_2", Order::Atomic),
            "INFINITY" => expr("INFINITY", Order::Atomic),
            _ => expr("PI", Order::Atomic),
        }
    }

    pub(super) fn math_number_property(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let property = self.field(block, "PROPERTY");
        match property.as_str() {
            "PRIME" => {
                let n = self.value_or(block, "NUMBER_TO_CHECK", Order::None, "0")?;
                self.registry
                    .add_declaration("math_is_prime", IS_PRIME, false, 0);
                expr(format!("mathIsPrime({n})"), Order::UnaryPostfix)
            }
            "WHOLE" => {
                let n = self.value_or(block, "NUMBER_TO_CHECK", Order::Relational, "0")?;
                expr(format!("{n} == floor({n})"), Order::Equality)
            }
            "POSITIVE" => {
                let n = self.value_or(block, "NUMBER_TO_CHECK", Order::Relational, "0")?;
                expr(format!("{n} > 0"), Order::Relational)
            }
            "NEGATIVE" => {
                let n = self.value_or(block, "NUMBER_TO_CHECK", Order::Relational, "0")?;
                expr(format!("{n} < 0"), Order::Relational)
            }
            "DIVISIBLE_BY" => {
                let n = self.value_or(block, "NUMBER_TO_CHECK", Order::UnaryPrefix, "0")?;
                let d = self.value_or(block, "DIVISOR", Order::UnaryPrefix, "1")?;
                expr(format!("(long){n} % (long){d} == 0"), Order::Equality)
            }
            "ODD" => {
                let n = self.value_or(block, "NUMBER_TO_CHECK", Order::UnaryPrefix, "0")?;
                expr(format!("(long){n} % 2 != 0"), Order::Equality)
            }
            _ => {
                let n = self.value_or(block, "NUMBER_TO_CHECK", Order::UnaryPrefix, "0")?;
                expr(format!("(long){n} % 2 == 0"), Order::Equality)
            }
        }
    }

    pub(super) fn math_round(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let func = match self.field(block, "OP").as_str() {
            "ROUNDUP" => "ceil",
            "ROUNDDOWN" => "floor",
            _ => "round",
        };
        let n = self.value_or(block, "NUM", Order::None, "0")?;
        expr(format!("{func}({n})"), Order::UnaryPostfix)
    }

    pub(super) fn math_modulo(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let a = self.value_or(block, "DIVIDEND", Order::None, "0")?;
        let b = self.value_or(block, "DIVISOR", Order::None, "1")?;
        expr(format!("fmod({a}, {b})"), Order::UnaryPostfix)
    }

    pub(super) fn math_constrain(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let value = self.value_or(block, "VALUE", Order::None, "0")?;
        let low = self.value_or(block, "LOW", Order::None, "0")?;
        let high = self.value_or(block, "HIGH", Order::None, "0")?;
        expr(format!("constrain({value}, {low}, {high})"), Order::UnaryPostfix)
    }

    pub(super) fn math_random_int(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let from = self.value_or(block, "FROM", Order::None, "0")?;
        let to = self.value_or(block, "TO", Order::Additive, "0")?;
        expr(format!("random({from}, {to} + 1)"), Order::UnaryPostfix)
    }

    pub(super) fn math_random_float(&mut self) -> Result<ArduinoCode> {
        expr("random(0, 10001) / 10000.0", Order::Multiplicative)
    }
}
