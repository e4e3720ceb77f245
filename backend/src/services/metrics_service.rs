use crate::errors::AppError;
use crate::models::InvestmentMetrics;

/// What `amount` invested at `purchase_price` is worth at `current_price`.
pub fn calculate(
    amount: f64,
    purchase_price: f64,
    current_price: f64,
) -> Result<InvestmentMetrics, AppError> {
    if !purchase_price.is_finite() || purchase_price <= 0.0 {
        return Err(AppError::InvalidPrice(purchase_price));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::Validation("Amount must be a positive number".to_string()));
    }

    let shares_purchased = amount / purchase_price;
    let current_value = shares_purchased * current_price;
    let gain_loss = current_value - amount;
    let percent_return = (gain_loss / amount) * 100.0;

    Ok(InvestmentMetrics {
        shares_purchased,
        current_value,
        gain_loss,
        percent_return,
        is_positive: gain_loss >= 0.0,
    })
}
